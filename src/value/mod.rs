//! This module contains the definition of the [`SymbolicValue`] and its
//! supporting types.

pub mod known;

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::{constant::BYTE_SIZE_BITS, value::known::KnownWord};

/// A symbolic value is an expression tree recording the operations that
/// produced a piece of data, without requiring that the data ever be made
/// concrete.
///
/// Every value is either fully concrete (a [`SymbolicValueData::Known`]
/// leaf), fully unconstrained (a [`SymbolicValueData::Unknown`] leaf with a
/// unique identity), or a combination of such leaves under the operations
/// below. Which concrete values a given tree can take is a question for the
/// [`crate::solver::Solver`] under the constraints of one execution path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SymbolicValue {
    /// The expression tree that forms this value.
    data: SymbolicValueData,
}

/// The type of a boxed symbolic value.
///
/// The vast majority of uses of [`SymbolicValue`] are in recursive
/// positions, so the constructors hand out boxes directly.
pub type BoxedVal = Box<SymbolicValue>;

impl SymbolicValue {
    /// Constructs a new `SymbolicValue` from the provided expression `data`.
    #[must_use]
    pub fn new(data: SymbolicValueData) -> BoxedVal {
        Box::new(Self { data })
    }

    /// Constructs a value whose bits are concretely known.
    #[must_use]
    pub fn known(value: impl Into<KnownWord>) -> BoxedVal {
        Self::new(SymbolicValueData::Known {
            value: value.into(),
        })
    }

    /// Constructs a fresh value of `bits` width about which nothing is
    /// known.
    ///
    /// Each call mints a new identity, so two unknowns are never the same
    /// value even when created from identical calls.
    #[must_use]
    #[allow(clippy::missing_panics_doc)] // The width bound is checked below
    pub fn unknown(bits: u8) -> BoxedVal {
        assert!(
            bits > 0 && usize::from(bits) <= crate::constant::WORD_SIZE_BITS,
            "Unknown values must be between 1 and word-sized bits wide"
        );
        Self::new(SymbolicValueData::Unknown {
            id: Uuid::new_v4(),
            bits,
        })
    }

    /// Constructs a fresh unconstrained byte.
    #[must_use]
    #[allow(clippy::missing_panics_doc)] // Eight bits always satisfies the width bound
    #[allow(clippy::cast_possible_truncation)] // A byte is 8 bits
    pub fn unknown_byte() -> BoxedVal {
        Self::unknown(BYTE_SIZE_BITS as u8)
    }

    /// Constructs the wrapping sum of two values.
    #[must_use]
    pub fn add(left: BoxedVal, right: BoxedVal) -> BoxedVal {
        Self::new(SymbolicValueData::Add { left, right })
    }

    /// Constructs the wrapping difference of two values.
    ///
    /// As narrower quantities are stored zero-extended, the difference of
    /// two bytes reinterpreted as a signed word is the usual C-style
    /// comparison result.
    #[must_use]
    pub fn sub(left: BoxedVal, right: BoxedVal) -> BoxedVal {
        Self::new(SymbolicValueData::Sub { left, right })
    }

    /// Constructs the equality of two values.
    #[must_use]
    pub fn eq(left: BoxedVal, right: BoxedVal) -> BoxedVal {
        Self::new(SymbolicValueData::Eq { left, right })
    }

    /// Constructs the disequality of two values.
    #[must_use]
    pub fn ne(left: BoxedVal, right: BoxedVal) -> BoxedVal {
        Self::not(Self::eq(left, right))
    }

    /// Constructs the conjunction of two boolean values.
    #[must_use]
    pub fn and(left: BoxedVal, right: BoxedVal) -> BoxedVal {
        Self::new(SymbolicValueData::And { left, right })
    }

    /// Constructs the disjunction of two boolean values.
    #[must_use]
    pub fn or(left: BoxedVal, right: BoxedVal) -> BoxedVal {
        Self::new(SymbolicValueData::Or { left, right })
    }

    /// Constructs the negation of a boolean value.
    #[must_use]
    pub fn not(value: BoxedVal) -> BoxedVal {
        Self::new(SymbolicValueData::Not { value })
    }

    /// Constructs `left < right` under signed interpretation of both sides.
    #[must_use]
    pub fn slt(left: BoxedVal, right: BoxedVal) -> BoxedVal {
        Self::new(SymbolicValueData::SignedLessThan { left, right })
    }

    /// Constructs `left > right` under signed interpretation of both sides.
    #[must_use]
    pub fn sgt(left: BoxedVal, right: BoxedVal) -> BoxedVal {
        Self::slt(right, left)
    }

    /// Constructs `left <= right` under signed interpretation of both
    /// sides.
    #[must_use]
    pub fn sle(left: BoxedVal, right: BoxedVal) -> BoxedVal {
        Self::not(Self::slt(right, left))
    }

    /// Constructs `left >= right` under signed interpretation of both
    /// sides.
    #[must_use]
    pub fn sge(left: BoxedVal, right: BoxedVal) -> BoxedVal {
        Self::not(Self::slt(left, right))
    }

    /// Constructs a conditional choice between two values.
    #[must_use]
    pub fn ite(condition: BoxedVal, then: BoxedVal, otherwise: BoxedVal) -> BoxedVal {
        Self::new(SymbolicValueData::Ite {
            condition,
            then,
            otherwise,
        })
    }

    /// Constructs the little-endian composition of the provided `bytes`
    /// into a single word.
    #[must_use]
    pub fn concat(bytes: Vec<BoxedVal>) -> BoxedVal {
        Self::new(SymbolicValueData::Concat { bytes })
    }

    /// Gets the expression tree that forms this value.
    #[must_use]
    pub fn data(&self) -> &SymbolicValueData {
        &self.data
    }

    /// Gets the concrete value of this expression, if it is a concrete
    /// leaf.
    ///
    /// Note that this is a purely structural query. An expression that is
    /// _forced_ to a single value by the path constraints but is not
    /// literally a [`SymbolicValueData::Known`] leaf answers [`None`] here;
    /// resolving those is the solver's job.
    #[must_use]
    pub fn as_known(&self) -> Option<KnownWord> {
        match &self.data {
            SymbolicValueData::Known { value } => Some(*value),
            _ => None,
        }
    }

    /// Collects the free variables of this expression into `out`, mapping
    /// each variable's identity to its bit width.
    pub fn collect_variables(&self, out: &mut BTreeMap<Uuid, u8>) {
        match &self.data {
            SymbolicValueData::Known { .. } => {}
            SymbolicValueData::Unknown { id, bits } => {
                out.insert(*id, *bits);
            }
            SymbolicValueData::Add { left, right }
            | SymbolicValueData::Sub { left, right }
            | SymbolicValueData::Eq { left, right }
            | SymbolicValueData::And { left, right }
            | SymbolicValueData::Or { left, right }
            | SymbolicValueData::SignedLessThan { left, right } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            SymbolicValueData::Not { value } => value.collect_variables(out),
            SymbolicValueData::Ite {
                condition,
                then,
                otherwise,
            } => {
                condition.collect_variables(out);
                then.collect_variables(out);
                otherwise.collect_variables(out);
            }
            SymbolicValueData::Concat { bytes } => {
                for byte in bytes {
                    byte.collect_variables(out);
                }
            }
        }
    }

    /// Collects the concrete constants mentioned by this expression into
    /// `out`.
    ///
    /// The built-in solver seeds its candidate domains from these.
    pub fn collect_constants(&self, out: &mut BTreeSet<u64>) {
        match &self.data {
            SymbolicValueData::Known { value } => {
                out.insert(value.value());
            }
            SymbolicValueData::Unknown { .. } => {}
            SymbolicValueData::Add { left, right }
            | SymbolicValueData::Sub { left, right }
            | SymbolicValueData::Eq { left, right }
            | SymbolicValueData::And { left, right }
            | SymbolicValueData::Or { left, right }
            | SymbolicValueData::SignedLessThan { left, right } => {
                left.collect_constants(out);
                right.collect_constants(out);
            }
            SymbolicValueData::Not { value } => value.collect_constants(out),
            SymbolicValueData::Ite {
                condition,
                then,
                otherwise,
            } => {
                condition.collect_constants(out);
                then.collect_constants(out);
                otherwise.collect_constants(out);
            }
            SymbolicValueData::Concat { bytes } => {
                for byte in bytes {
                    byte.collect_constants(out);
                }
            }
        }
    }
}

/// The expression structures out of which symbolic values are built.
///
/// This is intentionally the minimum language the execution core needs:
/// byte-level equality and ordering, boolean combination, conditional
/// selection, and little-endian byte composition. It does not attempt to
/// mirror the full instruction set of any machine; instruction semantics
/// live behind the [`crate::platform::Stepper`] seam.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SymbolicValueData {
    /// A value whose bits are concretely known.
    Known { value: KnownWord },

    /// A value with identity, but about which nothing else is known.
    Unknown { id: Uuid, bits: u8 },

    /// Wrapping addition of two values.
    Add { left: BoxedVal, right: BoxedVal },

    /// Wrapping subtraction of two values.
    Sub { left: BoxedVal, right: BoxedVal },

    /// Equality of two values, producing a boolean.
    Eq { left: BoxedVal, right: BoxedVal },

    /// Conjunction of two boolean values.
    And { left: BoxedVal, right: BoxedVal },

    /// Disjunction of two boolean values.
    Or { left: BoxedVal, right: BoxedVal },

    /// Negation of a boolean value.
    Not { value: BoxedVal },

    /// Signed comparison of two values, producing a boolean.
    SignedLessThan { left: BoxedVal, right: BoxedVal },

    /// Conditional choice between two values.
    Ite {
        condition: BoxedVal,
        then: BoxedVal,
        otherwise: BoxedVal,
    },

    /// Little-endian composition of individual bytes into a word.
    Concat { bytes: Vec<BoxedVal> },
}

/// The default value for a symbolic value's data is an
/// [`SymbolicValueData::Unknown`] byte about which nothing else is known.
impl Default for SymbolicValueData {
    #[allow(clippy::cast_possible_truncation)] // A byte is 8 bits
    fn default() -> Self {
        SymbolicValueData::Unknown {
            id: Uuid::new_v4(),
            bits: BYTE_SIZE_BITS as u8,
        }
    }
}

/// Turns a byte-buffer `pattern` into a sequence of symbolic byte values.
///
/// Each `+` in the pattern becomes a fresh unconstrained byte; every other
/// character becomes its concrete byte value. This mirrors the buffer
/// conventions of the test suites for fuzzing-oriented engines, where a
/// buffer such as `"ab+\0"` is two fixed bytes, one free byte, and a
/// terminator.
#[must_use]
pub fn symbolic_buffer(pattern: &str) -> Vec<BoxedVal> {
    pattern
        .bytes()
        .map(|byte| {
            if byte == b'+' {
                SymbolicValue::unknown_byte()
            } else {
                SymbolicValue::known(byte)
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use std::collections::{BTreeMap, BTreeSet};

    use super::{symbolic_buffer, SymbolicValue};

    #[test]
    fn known_values_answer_their_constant() {
        let value = SymbolicValue::known(0x41_u64);
        assert_eq!(value.as_known().unwrap().value(), 0x41);
    }

    #[test]
    fn unknown_values_are_distinct() {
        let first = SymbolicValue::unknown_byte();
        let second = SymbolicValue::unknown_byte();
        assert_ne!(first, second);
    }

    #[test]
    fn compound_values_are_not_structurally_known() {
        let sum = SymbolicValue::add(
            SymbolicValue::known(1_u64),
            SymbolicValue::known(2_u64),
        );
        assert!(sum.as_known().is_none());
    }

    #[test]
    fn collects_variables_across_the_tree() {
        let free = SymbolicValue::unknown_byte();
        let expr = SymbolicValue::ite(
            SymbolicValue::eq(free.clone(), SymbolicValue::known(0_u64)),
            SymbolicValue::known(1_u64),
            free.clone(),
        );

        let mut variables = BTreeMap::new();
        expr.collect_variables(&mut variables);
        assert_eq!(variables.len(), 1);
        assert_eq!(variables.values().next(), Some(&8));
    }

    #[test]
    fn collects_constants_across_the_tree() {
        let expr = SymbolicValue::sub(
            SymbolicValue::known(0x61_u64),
            SymbolicValue::unknown_byte(),
        );

        let mut constants = BTreeSet::new();
        expr.collect_constants(&mut constants);
        assert_eq!(constants, BTreeSet::from([0x61]));
    }

    #[test]
    fn buffers_mix_fixed_and_free_bytes() {
        let buffer = symbolic_buffer("a+\0");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer[0].as_known().unwrap().value(), u64::from(b'a'));
        assert!(buffer[1].as_known().is_none());
        assert_eq!(buffer[2].as_known().unwrap().value(), 0);
    }
}
