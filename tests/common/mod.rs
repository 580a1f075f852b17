//! Utilities for testing the execution core against a small machine with
//! a mapped stack.
#![allow(dead_code)]

use symex_core::{
    platform::{memory::Permissions, NopStepper, Platform, SymbolicPlatform},
    solver::EnumerationSolver,
    state::{Config, State},
    value::{symbolic_buffer, BoxedVal},
    SymbolicValue,
};

/// The lowest mapped stack address.
pub const STACK_BASE: u64 = 0x7fff_0000;

/// The size of the mapped stack in bytes.
pub const STACK_SIZE: u64 = 0x1000;

/// The initial stack pointer.
pub const STACK_TOP: u64 = STACK_BASE + STACK_SIZE;

/// The initial program counter.
pub const ENTRY_POINT: u64 = 0x40_0000;

/// Constructs a state whose platform has a mapped stack, a stack pointer
/// register `RSP`, and no-op instruction semantics.
#[must_use]
pub fn new_state() -> State<SymbolicPlatform> {
    new_state_with_config(Config::default())
}

/// Constructs a state as [`new_state`] does, under the provided `config`.
#[must_use]
pub fn new_state_with_config(config: Config) -> State<SymbolicPlatform> {
    let mut platform = SymbolicPlatform::new(NopStepper::new(4).in_rc());
    platform
        .memory_mut()
        .map(STACK_BASE, STACK_SIZE, Permissions::read_write())
        .unwrap();
    platform
        .registers_mut()
        .define("RSP", SymbolicValue::known(STACK_TOP));
    platform.set_pc(ENTRY_POINT);

    State::new(platform, EnumerationSolver::new().in_rc(), config)
}

/// Pushes `bytes` onto the stack of `state`, returning their address.
pub fn push_buffer(state: &mut State<SymbolicPlatform>, bytes: &[BoxedVal]) -> u64 {
    let top = state
        .platform()
        .read_register("RSP")
        .unwrap()
        .as_known()
        .unwrap()
        .value();
    let address = top - bytes.len() as u64;

    state.platform_mut().write_bytes(address, bytes).unwrap();
    state
        .platform_mut()
        .write_register("RSP", SymbolicValue::known(address))
        .unwrap();

    address
}

/// Pushes the buffer described by `pattern` onto the stack, where `+`
/// denotes an unconstrained byte, returning its address.
pub fn push_pattern(state: &mut State<SymbolicPlatform>, pattern: &str) -> u64 {
    push_buffer(state, &symbolic_buffer(pattern))
}

/// Reads the (possibly symbolic) byte at `address`.
pub fn byte_at(state: &State<SymbolicPlatform>, address: u64) -> BoxedVal {
    state.platform().read_bytes(address, 1).unwrap().remove(0)
}

/// Reads the byte at `address`, which must be concrete.
pub fn concrete_byte_at(state: &State<SymbolicPlatform>, address: u64) -> u64 {
    byte_at(state, address).as_known().unwrap().value()
}
