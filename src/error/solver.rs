//! This module contains errors raised by satisfiability and
//! value-enumeration queries.

use thiserror::Error;
use uuid::Uuid;

/// Errors that occur when answering solver queries.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error(
        "The query requires exploring {assignments} candidate assignment(s), which exceeds the \
         limit of {limit}"
    )]
    SearchSpaceExceeded { assignments: usize, limit: usize },

    #[error("The variable {id} has no value in the current assignment")]
    UnassignedVariable { id: Uuid },
}

/// The result type for solver queries.
pub type Result<T> = std::result::Result<T, Error>;
