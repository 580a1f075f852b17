//! This module contains a representation of concrete machine words that can
//! be known and manipulated statically.

use std::fmt::{Display, Formatter};

use crate::constant::WORD_SIZE_BYTES;

/// The type of data whose value is concretely known during symbolic
/// execution.
///
/// # Representation
///
/// At the level at which this core works, all values on the modelled
/// machine are bags of bits in a 64-bit word. Narrower quantities (bytes,
/// halves, and so on) are stored zero-extended; operations that care about
/// signedness reinterpret the bit pattern at their use site.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct KnownWord {
    value: u64,
}

impl KnownWord {
    /// Creates a known word representing zero.
    #[must_use]
    pub fn zero() -> Self {
        Self { value: 0 }
    }

    /// Constructs a new `KnownWord` from a `value` that fits in a machine
    /// word.
    #[must_use]
    pub fn from(value: impl Into<u64>) -> Self {
        let value = value.into();
        Self { value }
    }

    /// Gets the value of the known word.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Gets the value of the known word, reinterpreting the bit pattern as
    /// a signed number.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // The reinterpretation is the point
    pub fn value_signed(&self) -> i64 {
        self.value as i64
    }

    /// Gets the bytes of the word in little-endian order.
    #[must_use]
    pub fn to_le_bytes(self) -> [u8; WORD_SIZE_BYTES] {
        self.value.to_le_bytes()
    }
}

impl From<u64> for KnownWord {
    fn from(value: u64) -> Self {
        Self { value }
    }
}

impl From<u8> for KnownWord {
    fn from(value: u8) -> Self {
        Self {
            value: u64::from(value),
        }
    }
}

impl From<KnownWord> for u64 {
    fn from(value: KnownWord) -> Self {
        value.value
    }
}

/// Known words display as fixed-width hexadecimal to make addresses and
/// byte values read uniformly in debug output.
impl Display for KnownWord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:016x}", self.value)
    }
}
