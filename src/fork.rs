//! This module contains the scheduler-side half of the concretization
//! protocol: turning a rolled-back state and the request it raised into a
//! set of independent successor states.

use crate::{
    error::Result,
    platform::Platform,
    signal::{ConcretizationRequest, Policy},
    state::State,
    value::SymbolicValue,
};

/// Forks `state` on the expression in `request`, producing one successor
/// per concrete value selected under the request's policy.
///
/// Each successor is a clone of `state` with the constraint
/// `expression == value` added and the value written back to the location
/// the request names, so a retried step observes a concrete value there.
/// An infeasible expression yields no successors; the scheduler retires
/// the path.
///
/// # Errors
///
/// Returns [`Err`] if the solver fails to enumerate values for the
/// expression, or if a write-back target is invalid.
pub fn fork_on<P>(state: &State<P>, request: &ConcretizationRequest) -> Result<Vec<State<P>>>
where
    P: Platform,
{
    let solver = state.solver();
    let constraints = state.constraints();
    let expression = &request.expression;

    let values: Vec<u64> = match request.policy {
        Policy::One => solver
            .get_value(constraints, expression)?
            .into_iter()
            .collect(),
        Policy::All => solver.get_all_values(
            constraints,
            expression,
            state.config().concretization_value_limit,
        )?,
        Policy::Sampled => solver.get_all_values(
            constraints,
            expression,
            state.config().sampled_value_limit,
        )?,
        Policy::MinMax => match solver.min_max(constraints, expression)? {
            Some((low, high)) if low == high => vec![low],
            Some((low, high)) => vec![low, high],
            None => vec![],
        },
    };

    let mut successors = Vec::with_capacity(values.len());
    for value in values {
        let mut successor = state.clone();
        successor.constrain(SymbolicValue::eq(
            expression.clone(),
            SymbolicValue::known(value),
        ));
        request.write_back.apply(&mut successor, value)?;
        successors.push(successor);
    }

    Ok(successors)
}
