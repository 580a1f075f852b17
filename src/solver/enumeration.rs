//! This module contains the built-in solver, which answers queries by
//! enumerating a finite candidate domain for each free variable.
//!
//! # Boundedness
//!
//! The candidate domain for a variable is seeded from the concrete
//! constants mentioned anywhere in the query or the constraints (plus each
//! constant's immediate neighbours, plus the domain extremes). This makes
//! the solver exact for the byte-level equality and ordering queries the
//! execution core generates, while keeping every query finite. It is *not*
//! a general bitvector decision procedure: a query whose answer hinges on a
//! value mentioned nowhere in it may be answered incompletely. Clients
//! needing full generality can provide their own [`Solver`] implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use itertools::Itertools;
use uuid::Uuid;

use crate::{
    constant::{DEFAULT_SOLVER_SEARCH_LIMIT, WORD_SIZE_BITS},
    constraints::ConstraintSet,
    error::solver::{Error, Result},
    solver::Solver,
    value::{SymbolicValue, SymbolicValueData},
};

/// A concrete assignment of values to free variables.
type Assignment = BTreeMap<Uuid, u64>;

/// The built-in bounded-enumeration solver.
///
/// See the module documentation for the completeness trade-off it makes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumerationSolver {
    /// The maximum number of candidate assignments explored per query.
    search_limit: usize,
}

impl EnumerationSolver {
    /// Constructs a new solver with the default search limit.
    #[must_use]
    pub fn new() -> Self {
        let search_limit = DEFAULT_SOLVER_SEARCH_LIMIT;
        Self { search_limit }
    }

    /// Sets the maximum number of candidate assignments explored per query.
    #[must_use]
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Wraps `self` into an [`Rc`] for use as a [`crate::solver::DynSolver`].
    #[must_use]
    pub fn in_rc(self) -> Rc<dyn Solver> {
        Rc::new(self)
    }

    /// Builds the candidate domain for every free variable of the query.
    ///
    /// Returns the variable identities together with, for each, the sorted
    /// candidate values it will be tried at.
    fn domains(
        constraints: &ConstraintSet,
        expr: &SymbolicValue,
    ) -> (Vec<Uuid>, Vec<Vec<u64>>) {
        let mut variables = BTreeMap::new();
        let mut constants = BTreeSet::new();
        expr.collect_variables(&mut variables);
        expr.collect_constants(&mut constants);
        for fact in constraints.facts() {
            fact.collect_variables(&mut variables);
            fact.collect_constants(&mut constants);
        }

        let mut ids = Vec::with_capacity(variables.len());
        let mut candidate_sets = Vec::with_capacity(variables.len());
        for (id, bits) in variables {
            let mask = width_mask(bits);
            let mut candidates = BTreeSet::from([0, 1, mask]);
            for constant in &constants {
                candidates.insert(constant & mask);
                candidates.insert(constant.wrapping_sub(1) & mask);
                candidates.insert(constant.wrapping_add(1) & mask);
            }
            ids.push(id);
            candidate_sets.push(candidates.into_iter().collect());
        }

        (ids, candidate_sets)
    }

    /// Runs `visit` over every candidate assignment that satisfies
    /// `constraints`, stopping early when `visit` returns `false`.
    fn for_each_solution(
        &self,
        constraints: &ConstraintSet,
        expr: &SymbolicValue,
        mut visit: impl FnMut(&Assignment) -> bool,
    ) -> Result<()> {
        let (ids, candidate_sets) = Self::domains(constraints, expr);

        let mut assignments: usize = 1;
        for candidates in &candidate_sets {
            assignments = assignments
                .checked_mul(candidates.len())
                .unwrap_or(usize::MAX);
        }
        if assignments > self.search_limit {
            return Err(Error::SearchSpaceExceeded {
                assignments,
                limit: self.search_limit,
            });
        }

        // With no free variables there is exactly one (empty) assignment to
        // check.
        if ids.is_empty() {
            let empty = Assignment::new();
            if satisfies(constraints, &empty)? {
                visit(&empty);
            }
            return Ok(());
        }

        for combination in candidate_sets.into_iter().multi_cartesian_product() {
            let assignment: Assignment = ids.iter().copied().zip(combination).collect();
            if satisfies(constraints, &assignment)? && !visit(&assignment) {
                return Ok(());
            }
        }

        Ok(())
    }

    /// Collects the set of distinct values `expr` takes over all satisfying
    /// candidate assignments.
    fn solution_values(
        &self,
        constraints: &ConstraintSet,
        expr: &SymbolicValue,
    ) -> Result<BTreeSet<u64>> {
        let mut values = BTreeSet::new();
        let mut failure = None;
        self.for_each_solution(constraints, expr, |assignment| {
            match evaluate(expr, assignment) {
                Ok(value) => {
                    values.insert(value);
                    true
                }
                Err(error) => {
                    failure = Some(error);
                    false
                }
            }
        })?;

        match failure {
            Some(error) => Err(error),
            None => Ok(values),
        }
    }
}

impl Default for EnumerationSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for EnumerationSolver {
    fn can_be_true(&self, constraints: &ConstraintSet, expr: &SymbolicValue) -> Result<bool> {
        let mut witnessed = false;
        let mut failure = None;
        self.for_each_solution(constraints, expr, |assignment| {
            match evaluate(expr, assignment) {
                Ok(value) => {
                    witnessed = value != 0;
                    !witnessed
                }
                Err(error) => {
                    failure = Some(error);
                    false
                }
            }
        })?;

        match failure {
            Some(error) => Err(error),
            None => Ok(witnessed),
        }
    }

    fn get_value(&self, constraints: &ConstraintSet, expr: &SymbolicValue) -> Result<Option<u64>> {
        let mut value = None;
        let mut failure = None;
        self.for_each_solution(constraints, expr, |assignment| {
            match evaluate(expr, assignment) {
                Ok(found) => {
                    value = Some(found);
                    false
                }
                Err(error) => {
                    failure = Some(error);
                    false
                }
            }
        })?;

        match failure {
            Some(error) => Err(error),
            None => Ok(value),
        }
    }

    fn get_all_values(
        &self,
        constraints: &ConstraintSet,
        expr: &SymbolicValue,
        limit: usize,
    ) -> Result<Vec<u64>> {
        let values = self.solution_values(constraints, expr)?;
        Ok(values.into_iter().take(limit).collect())
    }

    fn min_max(
        &self,
        constraints: &ConstraintSet,
        expr: &SymbolicValue,
    ) -> Result<Option<(u64, u64)>> {
        let values = self.solution_values(constraints, expr)?;
        let min = values.iter().next().copied();
        let max = values.iter().next_back().copied();
        Ok(min.zip(max))
    }
}

/// Gets the bit mask selecting the low `bits` bits of a word.
fn width_mask(bits: u8) -> u64 {
    if usize::from(bits) >= WORD_SIZE_BITS {
        u64::MAX
    } else {
        (1_u64 << bits) - 1
    }
}

/// Checks whether every fact in `constraints` holds under `assignment`.
fn satisfies(constraints: &ConstraintSet, assignment: &Assignment) -> Result<bool> {
    for fact in constraints.facts() {
        if evaluate(fact, assignment)? == 0 {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Evaluates `value` to a concrete word under `assignment`.
///
/// Boolean-producing operations evaluate to `0` or `1`; arithmetic wraps at
/// the word width; signed comparison reinterprets the word's bit pattern.
fn evaluate(value: &SymbolicValue, assignment: &Assignment) -> Result<u64> {
    let result = match value.data() {
        SymbolicValueData::Known { value } => value.value(),
        SymbolicValueData::Unknown { id, .. } => *assignment
            .get(id)
            .ok_or(Error::UnassignedVariable { id: *id })?,
        SymbolicValueData::Add { left, right } => {
            evaluate(left, assignment)?.wrapping_add(evaluate(right, assignment)?)
        }
        SymbolicValueData::Sub { left, right } => {
            evaluate(left, assignment)?.wrapping_sub(evaluate(right, assignment)?)
        }
        SymbolicValueData::Eq { left, right } => {
            u64::from(evaluate(left, assignment)? == evaluate(right, assignment)?)
        }
        SymbolicValueData::And { left, right } => {
            u64::from(evaluate(left, assignment)? != 0 && evaluate(right, assignment)? != 0)
        }
        SymbolicValueData::Or { left, right } => {
            u64::from(evaluate(left, assignment)? != 0 || evaluate(right, assignment)? != 0)
        }
        SymbolicValueData::Not { value } => u64::from(evaluate(value, assignment)? == 0),
        #[allow(clippy::cast_possible_wrap)] // The reinterpretation is the semantics
        SymbolicValueData::SignedLessThan { left, right } => u64::from(
            (evaluate(left, assignment)? as i64) < (evaluate(right, assignment)? as i64),
        ),
        SymbolicValueData::Ite {
            condition,
            then,
            otherwise,
        } => {
            if evaluate(condition, assignment)? != 0 {
                evaluate(then, assignment)?
            } else {
                evaluate(otherwise, assignment)?
            }
        }
        SymbolicValueData::Concat { bytes } => {
            let mut word = 0_u64;
            for (index, byte) in bytes.iter().enumerate() {
                let byte_value = evaluate(byte, assignment)? & 0xff;
                word |= byte_value << (index * crate::constant::BYTE_SIZE_BITS);
            }
            word
        }
    };

    Ok(result)
}

#[cfg(test)]
mod test {
    use super::EnumerationSolver;
    use crate::{
        constraints::ConstraintSet,
        solver::Solver,
        value::SymbolicValue,
    };

    #[test]
    fn concrete_queries_need_no_variables() -> anyhow::Result<()> {
        let solver = EnumerationSolver::new();
        let constraints = ConstraintSet::new();
        let truth = SymbolicValue::eq(
            SymbolicValue::known(1_u64),
            SymbolicValue::known(1_u64),
        );

        assert!(solver.can_be_true(&constraints, &truth)?);
        assert!(solver.must_be_true(&constraints, &truth)?);

        Ok(())
    }

    #[test]
    fn an_unconstrained_byte_can_be_anything_interesting() -> anyhow::Result<()> {
        let solver = EnumerationSolver::new();
        let constraints = ConstraintSet::new();
        let byte = SymbolicValue::unknown_byte();
        let is_null = SymbolicValue::eq(byte.clone(), SymbolicValue::known(0_u64));

        assert!(solver.can_be_true(&constraints, &is_null)?);
        assert!(!solver.must_be_true(&constraints, &is_null)?);
        assert_eq!(solver.min_max(&constraints, &byte)?, Some((0, 0xff)));

        Ok(())
    }

    #[test]
    fn constraints_narrow_the_answers() -> anyhow::Result<()> {
        let solver = EnumerationSolver::new();
        let mut constraints = ConstraintSet::new();
        let byte = SymbolicValue::unknown_byte();
        constraints.add(SymbolicValue::eq(
            byte.clone(),
            SymbolicValue::known(0x61_u64),
        ));

        let is_a = SymbolicValue::eq(byte.clone(), SymbolicValue::known(0x61_u64));
        assert!(solver.must_be_true(&constraints, &is_a)?);

        let values = solver.get_all_values(&constraints, &byte, 16)?;
        assert_eq!(values, vec![0x61]);

        Ok(())
    }

    #[test]
    fn contradictory_constraints_have_no_solutions() -> anyhow::Result<()> {
        let solver = EnumerationSolver::new();
        let mut constraints = ConstraintSet::new();
        let byte = SymbolicValue::unknown_byte();
        constraints.add(SymbolicValue::eq(
            byte.clone(),
            SymbolicValue::known(3_u64),
        ));
        constraints.add(SymbolicValue::eq(
            byte.clone(),
            SymbolicValue::known(4_u64),
        ));

        assert_eq!(solver.get_value(&constraints, &byte)?, None);
        assert_eq!(solver.min_max(&constraints, &byte)?, None);
        assert!(solver.get_all_values(&constraints, &byte, 16)?.is_empty());

        Ok(())
    }

    #[test]
    fn disjunctive_constraints_enumerate_each_branch() -> anyhow::Result<()> {
        let solver = EnumerationSolver::new();
        let mut constraints = ConstraintSet::new();
        let byte = SymbolicValue::unknown_byte();
        constraints.add(SymbolicValue::or(
            SymbolicValue::eq(byte.clone(), SymbolicValue::known(2_u64)),
            SymbolicValue::eq(byte.clone(), SymbolicValue::known(9_u64)),
        ));

        let values = solver.get_all_values(&constraints, &byte, 16)?;
        assert_eq!(values, vec![2, 9]);
        assert_eq!(solver.min_max(&constraints, &byte)?, Some((2, 9)));

        Ok(())
    }

    #[test]
    fn the_search_space_is_capped() {
        let solver = EnumerationSolver::new().with_search_limit(2);
        let mut constraints = ConstraintSet::new();
        let first = SymbolicValue::unknown_byte();
        let second = SymbolicValue::unknown_byte();
        constraints.add(SymbolicValue::eq(first.clone(), second));

        let result = solver.get_value(&constraints, &first);
        assert!(result.is_err());
    }

    #[test]
    fn signed_comparison_sees_wrapped_differences() -> anyhow::Result<()> {
        let solver = EnumerationSolver::new();
        let constraints = ConstraintSet::new();
        let difference = SymbolicValue::sub(
            SymbolicValue::known(u64::from(b'a')),
            SymbolicValue::known(u64::from(b'b')),
        );
        let negative = SymbolicValue::slt(difference, SymbolicValue::known(0_u64));

        assert!(solver.must_be_true(&constraints, &negative)?);

        Ok(())
    }
}
