//! This module contains the signal vocabulary through which an execution
//! state communicates with its owning scheduler.
//!
//! All of these travel as ordinary values in the [`Interrupt`] returned
//! from [`crate::state::State::execute`], so the scheduler's fork logic is
//! driven by explicit matching rather than by unwinding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    error::Result,
    platform::Platform,
    state::State,
    value::{BoxedVal, SymbolicValue},
};

/// How a concretization should be resolved into concrete values by the
/// scheduler.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Policy {
    /// Pick any one satisfying value.
    One,

    /// Enumerate all satisfying values, up to the configured cap.
    All,

    /// Find the extremal (minimum and maximum) satisfying values.
    MinMax,

    /// Enumerate a bounded sample of satisfying values.
    Sampled,
}

/// Where a concrete value chosen by the scheduler must be written so that
/// re-stepping the instruction succeeds.
///
/// This is deliberately a plain value object rather than a closure: it
/// captures no references into the state that raised the signal, so it can
/// be applied to any clone of that state.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum WriteBack {
    /// The value belongs in the named register.
    Register { name: String },

    /// The value belongs at `address`, written as `size` little-endian
    /// bytes.
    Memory { address: u64, size: usize },
}

impl WriteBack {
    /// Writes the chosen concrete `value` into `state` at the location this
    /// write-back describes.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the target register or memory is not present on
    /// the provided state.
    pub fn apply<P: Platform>(&self, state: &mut State<P>, value: u64) -> Result<()> {
        match self {
            Self::Register { name } => {
                state
                    .platform_mut()
                    .write_register(name, SymbolicValue::known(value))?;
            }
            Self::Memory { address, size } => {
                state.platform_mut().write_int(*address, value, *size)?;
            }
        }

        Ok(())
    }
}

/// A request for the scheduler to resolve a symbolic expression into one or
/// more concrete possibilities.
///
/// A state that returns one of these from [`crate::state::State::execute`]
/// has already been rolled back: re-stepping any clone (after applying the
/// write-back) retries the same instruction.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{reason}")]
pub struct ConcretizationRequest {
    /// A human-readable description of why the value is needed.
    pub reason: String,

    /// The symbolic expression whose concrete value is needed.
    pub expression: BoxedVal,

    /// How the scheduler should resolve the expression into values.
    pub policy: Policy,

    /// Where each resolved value must be written in the receiving clone.
    pub write_back: WriteBack,
}

impl ConcretizationRequest {
    /// Constructs a new concretization request.
    pub fn new(
        reason: impl Into<String>,
        expression: BoxedVal,
        policy: Policy,
        write_back: WriteBack,
    ) -> Self {
        Self {
            reason: reason.into(),
            expression,
            policy,
            write_back,
        }
    }
}

/// A signal that exploration of one exact state has ended.
///
/// A terminated state must never be stepped again; the scheduler discards
/// it, optionally after extracting a test case.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
#[error("{reason}")]
pub struct Termination {
    /// A human-readable description of why the path ended.
    pub reason: String,

    /// Whether the path merits preservation as a test case.
    pub preserve_testcase: bool,
}

impl Termination {
    /// Constructs a new termination signal.
    pub fn new(reason: impl Into<String>, preserve_testcase: bool) -> Self {
        Self {
            reason: reason.into(),
            preserve_testcase,
        }
    }
}

/// The non-normal outcomes of advancing or modelling a state, as seen by
/// the owning scheduler.
#[derive(Clone, Debug, Error)]
pub enum Interrupt {
    /// Further progress requires a concrete value; the state has been
    /// rolled back and may be forked and retried.
    #[error(transparent)]
    Concretize(#[from] ConcretizationRequest),

    /// The path has ended; the state must not be stepped again.
    #[error(transparent)]
    Terminate(#[from] Termination),

    /// An internal failure that is neither a fork point nor a property of
    /// the explored path.
    #[error(transparent)]
    Internal(#[from] crate::error::Error),
}
