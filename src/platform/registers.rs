//! This module contains the register file of the modelled machine.

use std::collections::HashMap;

use crate::{
    error::execution::{Error, Result},
    value::BoxedVal,
};

/// The named registers of the modelled machine, together with the two
/// concrete continuation fields every platform carries: the program counter
/// and the previous program counter.
///
/// General registers hold symbolic values; the continuation fields are kept
/// concrete because they are exactly what a checkpoint must capture to make
/// a rolled-back instruction retryable.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegisterFile {
    /// The general registers, by name.
    values: HashMap<String, BoxedVal>,

    /// The program counter.
    pc: u64,

    /// The program counter of the previously executed instruction.
    last_pc: u64,
}

impl RegisterFile {
    /// Constructs a register file with no defined registers and both
    /// continuation fields at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines the register `name`, giving it the provided initial `value`.
    ///
    /// Platforms call this while describing their register set; it will
    /// happily overwrite an existing definition.
    pub fn define(&mut self, name: impl Into<String>, value: BoxedVal) {
        self.values.insert(name.into(), value);
    }

    /// Reads the current value of the register `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if no register of that name is defined.
    pub fn read(&self, name: &str) -> Result<BoxedVal> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRegister { name: name.into() })
    }

    /// Writes `value` into the register `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if no register of that name is defined.
    pub fn write(&mut self, name: &str, value: BoxedVal) -> Result<()> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::UnknownRegister { name: name.into() }),
        }
    }

    /// Gets the current program counter.
    #[must_use]
    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Sets the current program counter.
    pub fn set_pc(&mut self, pc: u64) {
        self.pc = pc;
    }

    /// Gets the program counter of the previously executed instruction.
    #[must_use]
    pub fn last_pc(&self) -> u64 {
        self.last_pc
    }

    /// Sets the program counter of the previously executed instruction.
    pub fn set_last_pc(&mut self, pc: u64) {
        self.last_pc = pc;
    }
}
