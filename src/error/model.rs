//! This module contains errors raised when dispatching to call models.

use thiserror::Error;

/// Errors that occur when invoking a registered call model.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The model {model:?} takes {expected} argument(s) but {actual} were provided")]
    WrongArgumentCount {
        model: String,
        expected: usize,
        actual: usize,
    },
}

/// The result type for model dispatch.
pub type Result<T> = std::result::Result<T, Error>;
