//! A library implementing the execution core of a symbolic execution
//! engine: independent execution states over a pluggable machine
//! platform, a checkpointed step protocol whose recoverable failures are
//! uniform concretization requests, scheduler-side forking on those
//! requests, and call models that summarise C string functions as
//! symbolic expressions.
//!
//! The library is a toolkit rather than a whole engine. It deliberately
//! has no opinion on scheduling order, test-case extraction, or the
//! instruction semantics of any particular architecture; those plug in
//! behind the [`platform::Stepper`] and [`solver::Solver`] seams.
#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod constant;
pub mod constraints;
pub mod error;
pub mod fork;
pub mod models;
pub mod platform;
pub mod signal;
pub mod solver;
pub mod state;
pub mod value;

pub use fork::fork_on;
pub use signal::{ConcretizationRequest, Interrupt, Policy, Termination, WriteBack};
pub use state::{CheckpointData, Config, State};
pub use value::{BoxedVal, SymbolicValue};
