//! This module contains the interface through which the execution core asks
//! satisfiability and value-enumeration questions, together with the
//! built-in bounded implementation of that interface.
//!
//! The solver is deliberately a collaborator behind a trait: the core never
//! resolves a concretization itself, it only asks whether facts can or must
//! hold and leaves forking decisions to whoever owns the states.

pub mod enumeration;

use std::{fmt::Debug, rc::Rc};

pub use enumeration::EnumerationSolver;

use crate::{
    constraints::ConstraintSet,
    error::solver::Result,
    value::SymbolicValue,
};

/// A dynamically dispatched [`Solver`] instance.
///
/// Solvers are stateless with respect to any one path, so a single instance
/// is shared between a state and all of its forks.
pub type DynSolver = Rc<dyn Solver>;

/// The interface to an object that can answer questions about symbolic
/// values under the facts of one execution path.
///
/// All queries are made against an explicit [`ConstraintSet`]; there is no
/// ambient solver session to reset between queries.
pub trait Solver
where
    Self: Debug,
{
    /// Checks if `expr` can evaluate to true under some assignment that
    /// satisfies `constraints`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the query cannot be answered.
    fn can_be_true(&self, constraints: &ConstraintSet, expr: &SymbolicValue) -> Result<bool>;

    /// Checks if `expr` evaluates to true under every assignment that
    /// satisfies `constraints`.
    ///
    /// The provided implementation asks whether the negation can hold.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the query cannot be answered.
    fn must_be_true(&self, constraints: &ConstraintSet, expr: &SymbolicValue) -> Result<bool> {
        let negated = SymbolicValue::not(Box::new(expr.clone()));
        Ok(!self.can_be_true(constraints, &negated)?)
    }

    /// Gets one concrete value that `expr` can take under `constraints`, or
    /// [`None`] if the constraints are unsatisfiable.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the query cannot be answered.
    fn get_value(&self, constraints: &ConstraintSet, expr: &SymbolicValue) -> Result<Option<u64>>;

    /// Gets up to `limit` distinct concrete values that `expr` can take
    /// under `constraints`.
    ///
    /// A result containing exactly `limit` values must be treated as "at
    /// least these, possibly more".
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the query cannot be answered.
    fn get_all_values(
        &self,
        constraints: &ConstraintSet,
        expr: &SymbolicValue,
        limit: usize,
    ) -> Result<Vec<u64>>;

    /// Gets the extremal (minimum and maximum, by unsigned interpretation)
    /// concrete values that `expr` can take under `constraints`, or
    /// [`None`] if the constraints are unsatisfiable.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the query cannot be answered.
    fn min_max(
        &self,
        constraints: &ConstraintSet,
        expr: &SymbolicValue,
    ) -> Result<Option<(u64, u64)>>;
}
