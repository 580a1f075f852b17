//! This module contains errors raised by the modelled machine's memory map.
//!
//! These are the fatal-fault signal source for the execution core: a state
//! that trips one of these while stepping is terminated with its faulting
//! registers intact, as the fault itself is the evidence being sought.

use thiserror::Error;

use crate::error::container;

/// Errors that occur when accessing the byte-addressed memory of the
/// modelled machine.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("Access of {size} byte(s) at 0x{address:x} falls outside every mapped region")]
    UnmappedAccess { address: u64, size: usize },

    #[error("Access at 0x{address:x} violates the permissions of its region: {operation}")]
    PermissionViolation { address: u64, operation: String },

    #[error("Region at 0x{start:x} of {size} byte(s) overlaps an existing mapping")]
    RegionOverlap { start: u64, size: u64 },
}

/// A memory error with the machine address at which the access was made.
pub type LocatedError = container::Located<Error>;

/// The result type for memory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Make it possible to attach addresses to these errors.
impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, address: u64) -> Self::Located {
        container::Located {
            location: address,
            payload: self,
        }
    }
}
