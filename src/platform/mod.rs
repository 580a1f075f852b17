//! This module contains the machine platform: the capability surface
//! through which the execution core touches registers, memory, and the
//! single-step instruction interpreter.
//!
//! The interpreter itself is an external collaborator. It plugs in behind
//! the [`Stepper`] seam and communicates inability to proceed through the
//! structured [`StepError`] vocabulary rather than by resolving anything
//! itself.

pub mod memory;
pub mod registers;

use std::{fmt::Debug, rc::Rc};

use thiserror::Error;

use crate::{
    error::{execution, memory as memory_error},
    platform::{
        memory::Memory,
        registers::RegisterFile,
    },
    signal::{ConcretizationRequest, Policy, Termination},
    value::BoxedVal,
};

/// The outcome of successfully executing one instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StepResult {
    /// The program counter after the step.
    pub pc: u64,
}

/// The structured signals a platform raises when it cannot complete a
/// single step.
///
/// The first three are recoverable by forking; the state that receives
/// them rolls itself back before passing a uniform
/// [`ConcretizationRequest`] to its scheduler. Memory faults and
/// terminations end the path.
#[derive(Clone, Debug, Error)]
pub enum StepError {
    /// Instruction semantics require a concrete value in the named
    /// register, but it currently holds an unresolved symbolic value.
    #[error("Register {name:?} requires a concrete value")]
    ConcretizeRegister { name: String, policy: Policy },

    /// Instruction semantics require the `size`-byte quantity at `address`
    /// to be concrete, but it currently is not.
    #[error("Memory at 0x{address:x} ({size} byte(s)) requires a concrete value")]
    ConcretizeMemory {
        address: u64,
        size: usize,
        policy: Policy,
    },

    /// A lower layer has already shaped its need into the uniform request
    /// form; it is passed along unchanged.
    #[error(transparent)]
    Concretize(#[from] ConcretizationRequest),

    /// The access faulted against the memory map. The platform state at
    /// the moment of the fault is evidence and must not be rolled back.
    #[error(transparent)]
    MemoryFault(#[from] memory_error::Error),

    /// The path ended below this core, for example through a clean program
    /// exit.
    #[error(transparent)]
    Terminate(#[from] Termination),

    /// An internal failure unrelated to the explored path.
    #[error(transparent)]
    Internal(#[from] crate::error::Error),
}

/// The interface to the object that performs one native instruction's
/// semantics against the platform's registers and memory.
pub trait Stepper
where
    Self: Debug,
{
    /// Executes exactly one instruction.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] with the appropriate [`StepError`] signal if the
    /// instruction cannot be completed.
    fn step(&self, registers: &mut RegisterFile, memory: &mut Memory)
        -> Result<StepResult, StepError>;
}

/// A dynamically dispatched [`Stepper`] instance.
///
/// Steppers hold no per-path state, so a single instance is shared between
/// a platform and all clones made of it.
pub type DynStepper = Rc<dyn Stepper>;

/// A [`Stepper`] that models every instruction as a no-op of fixed width.
///
/// Useful as a stand-in wherever the instruction stream's semantics are
/// irrelevant to what is being exercised.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NopStepper {
    /// The fixed instruction width by which the program counter advances.
    width: u64,
}

impl NopStepper {
    /// Constructs a stepper advancing the program counter by `width` bytes
    /// per step.
    #[must_use]
    pub fn new(width: u64) -> Self {
        Self { width }
    }

    /// Wraps `self` into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> Rc<dyn Stepper> {
        Rc::new(self)
    }
}

impl Default for NopStepper {
    fn default() -> Self {
        Self { width: 4 }
    }
}

impl Stepper for NopStepper {
    fn step(
        &self,
        registers: &mut RegisterFile,
        _memory: &mut Memory,
    ) -> Result<StepResult, StepError> {
        let pc = registers.pc();
        registers.set_last_pc(pc);
        registers.set_pc(pc + self.width);

        Ok(StepResult {
            pc: registers.pc(),
        })
    }
}

/// The capability surface a machine platform exposes to the execution
/// core.
///
/// Concrete and symbolic implementations are interchangeable behind this
/// trait; the core never assumes anything about how the platform realises
/// these operations. Platforms own their data outright, so the trait
/// carries `'static`, which call models need for dynamic dispatch.
pub trait Platform
where
    Self: Clone + Debug + 'static,
{
    /// Executes exactly one instruction on the current platform state.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] with a [`StepError`] signal if the instruction
    /// cannot be completed.
    fn step(&mut self) -> Result<StepResult, StepError>;

    /// Reads the current (possibly symbolic) value of the register `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if no register of that name is defined.
    fn read_register(&self, name: &str) -> execution::Result<BoxedVal>;

    /// Writes `value` into the register `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if no register of that name is defined.
    fn write_register(&mut self, name: &str, value: BoxedVal) -> execution::Result<()>;

    /// Reads `count` bytes starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the range is unmapped or not readable.
    fn read_bytes(&self, address: u64, count: usize) -> memory_error::Result<Vec<BoxedVal>>;

    /// Writes the provided `bytes` starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the range is unmapped or not writable.
    fn write_bytes(&mut self, address: u64, bytes: &[BoxedVal]) -> memory_error::Result<()>;

    /// Reads the `size`-byte little-endian quantity at `address` as a
    /// single value.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the range is unmapped or not readable.
    fn read_int(&self, address: u64, size: usize) -> memory_error::Result<BoxedVal>;

    /// Writes `value` at `address` as a `size`-byte little-endian
    /// quantity.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the range is unmapped or not writable.
    fn write_int(&mut self, address: u64, value: u64, size: usize) -> memory_error::Result<()>;

    /// Gets the current program counter.
    fn pc(&self) -> u64;

    /// Sets the current program counter.
    fn set_pc(&mut self, pc: u64);

    /// Gets the program counter of the previously executed instruction.
    fn last_pc(&self) -> u64;

    /// Sets the program counter of the previously executed instruction.
    fn set_last_pc(&mut self, pc: u64);
}

/// The standard platform implementation: a symbolic register file and a
/// region-mapped symbolic memory, with instruction semantics delegated to
/// a pluggable [`Stepper`].
#[derive(Clone, Debug)]
pub struct SymbolicPlatform {
    /// The registers of the modelled machine.
    registers: RegisterFile,

    /// The memory of the modelled machine.
    memory: Memory,

    /// The single-instruction interpreter.
    stepper: DynStepper,
}

impl SymbolicPlatform {
    /// Constructs a new platform with empty registers and memory, executing
    /// instructions through the provided `stepper`.
    #[must_use]
    pub fn new(stepper: DynStepper) -> Self {
        let registers = RegisterFile::new();
        let memory = Memory::new();
        Self {
            registers,
            memory,
            stepper,
        }
    }

    /// Gets the platform's register file.
    #[must_use]
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Gets the platform's register file for modification.
    #[must_use]
    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    /// Gets the platform's memory.
    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Gets the platform's memory for modification.
    #[must_use]
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
}

impl Platform for SymbolicPlatform {
    fn step(&mut self) -> Result<StepResult, StepError> {
        let stepper = self.stepper.clone();
        stepper.step(&mut self.registers, &mut self.memory)
    }

    fn read_register(&self, name: &str) -> execution::Result<BoxedVal> {
        self.registers.read(name)
    }

    fn write_register(&mut self, name: &str, value: BoxedVal) -> execution::Result<()> {
        self.registers.write(name, value)
    }

    fn read_bytes(&self, address: u64, count: usize) -> memory_error::Result<Vec<BoxedVal>> {
        self.memory.read(address, count)
    }

    fn write_bytes(&mut self, address: u64, bytes: &[BoxedVal]) -> memory_error::Result<()> {
        self.memory.write(address, bytes)
    }

    fn read_int(&self, address: u64, size: usize) -> memory_error::Result<BoxedVal> {
        self.memory.read_int(address, size)
    }

    fn write_int(&mut self, address: u64, value: u64, size: usize) -> memory_error::Result<()> {
        self.memory.write_int(address, value, size)
    }

    fn pc(&self) -> u64 {
        self.registers.pc()
    }

    fn set_pc(&mut self, pc: u64) {
        self.registers.set_pc(pc);
    }

    fn last_pc(&self) -> u64 {
        self.registers.last_pc()
    }

    fn set_last_pc(&mut self, pc: u64) {
        self.registers.set_last_pc(pc);
    }
}
