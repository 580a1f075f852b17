//! This module contains the constraint store accumulated along one
//! execution path.

use crate::value::BoxedVal;

/// The set of boolean facts that have been asserted along one execution
/// path.
///
/// Every [`crate::state::State`] exclusively owns its constraint set; there
/// is no process-wide solver session. Forking a path clones the set, after
/// which the two copies evolve independently.
///
/// The store is append-only: facts are never removed, only narrowed further
/// by later facts.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConstraintSet {
    facts: Vec<BoxedVal>,
}

impl ConstraintSet {
    /// Constructs a constraint set containing no facts.
    #[must_use]
    pub fn new() -> Self {
        let facts = Vec::new();
        Self { facts }
    }

    /// Adds the boolean `fact` to the set.
    pub fn add(&mut self, fact: BoxedVal) {
        self.facts.push(fact);
    }

    /// Gets the facts asserted so far, in the order they were added.
    #[must_use]
    pub fn facts(&self) -> &[BoxedVal] {
        self.facts.as_slice()
    }

    /// Gets the number of facts in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Checks if any facts have been asserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
