//! This module contains the primary error type for the library's interface.
//! It also re-exports the more specific error types that are
//! subsystem-specific.

pub mod container;
pub mod execution;
pub mod memory;
pub mod model;
pub mod solver;

use thiserror::Error;

/// The interface result type for the library.
///
/// # Usage
///
/// Any function considered to be part of the public interface of the library
/// should return this result type. Subsystems should return the
/// more-specific child error types as appropriate.
pub type Result<T> = std::result::Result<T, Error>;

/// The interface error type for the library.
///
/// All errors returned from the library interface (and hence encountered by
/// the clients of the library) should be members of this enum.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// Errors from stepping or inspecting an execution state.
    #[error(transparent)]
    Execution(#[from] execution::Error),

    /// Errors from the modelled machine's memory map.
    #[error(transparent)]
    Memory(#[from] memory::Error),

    /// Errors from dispatching to a call model.
    #[error(transparent)]
    Model(#[from] model::Error),

    /// Errors from the solver backend.
    #[error(transparent)]
    Solver(#[from] solver::Error),

    /// An unknown error, represented as a string.
    #[error("Unknown Error: {_0:?}")]
    Other(String),
}

impl Error {
    /// Constructs an unknown error with the provided `message`.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
