//! This module contains errors pertaining to stepping and inspecting an
//! execution state.

use thiserror::Error;

/// Errors that occur at the execution-state and platform level.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The register {name:?} is not defined on this platform")]
    UnknownRegister { name: String },
}

/// The result type for methods that may have execution errors.
pub type Result<T> = std::result::Result<T, Error>;
