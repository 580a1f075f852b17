//! This module contains call models for the C string functions whose
//! behaviour is determined entirely by the position of the terminating
//! zero byte.
//!
//! Each model scans the relevant buffer once. Bytes whose zero-ness the
//! path condition already decides are handled concretely; only bytes that
//! could go either way contribute symbolic structure to the result, as a
//! chain of conditionals anchored at the first byte that is definitely the
//! terminator.

use crate::{
    models::{classify, read_byte, ByteClass, CallModel},
    platform::Platform,
    signal::{ConcretizationRequest, Interrupt, Policy, Termination, WriteBack},
    state::State,
    value::{BoxedVal, SymbolicValue},
};

/// Computes the expression for `strlen` of the string at `address`.
///
/// The result is a chain of conditionals over the bytes that could be the
/// terminator, anchored at the first byte that definitely is.
///
/// # Errors
///
/// Returns [`Err`] if the scan bound is reached without a definite
/// terminator, or if a read faults.
pub fn strlen<P>(state: &mut State<P>, address: u64) -> Result<BoxedVal, Interrupt>
where
    P: Platform,
{
    let limit = state.config().string_scan_limit;
    let mut pending: Vec<(u64, BoxedVal)> = Vec::new();

    for offset in 0..limit {
        let offset = offset as u64;
        let byte = read_byte(state, address + offset)?;

        match classify(state, &byte)? {
            ByteClass::DefinitelyZero => {
                let mut result = SymbolicValue::known(offset);
                for (candidate, byte) in pending.into_iter().rev() {
                    result = SymbolicValue::ite(
                        SymbolicValue::eq(byte, SymbolicValue::known(0_u64)),
                        SymbolicValue::known(candidate),
                        result,
                    );
                }
                return Ok(result);
            }
            ByteClass::DefinitelyNonzero => (),
            ByteClass::Ambiguous => pending.push((offset, byte)),
        }
    }

    let first_ambiguous = pending
        .into_iter()
        .next()
        .map(|(offset, byte)| (address + offset, byte));
    Err(scan_overrun(address, first_ambiguous, limit))
}

/// Computes the expression for `strcmp` of the strings at `left` and
/// `right`.
///
/// The result is the difference of the byte pair at which the comparison
/// stops, selected by a chain of conditionals over the offsets at which it
/// *might* stop.
///
/// # Errors
///
/// Returns [`Err`] if the scan bound is reached without the comparison
/// definitely stopping, or if a read faults.
pub fn strcmp<P>(state: &mut State<P>, left: u64, right: u64) -> Result<BoxedVal, Interrupt>
where
    P: Platform,
{
    let limit = state.config().string_scan_limit;
    let mut pending: Vec<(BoxedVal, BoxedVal)> = Vec::new();
    let mut undecided: Option<(u64, BoxedVal)> = None;

    for offset in 0..limit {
        let offset = offset as u64;
        let left_byte = read_byte(state, left + offset)?;
        let right_byte = read_byte(state, right + offset)?;

        // The comparison moves past this offset only while both bytes are
        // nonzero and equal.
        let proceed = SymbolicValue::and(
            SymbolicValue::ne(left_byte.clone(), SymbolicValue::known(0_u64)),
            SymbolicValue::and(
                SymbolicValue::ne(right_byte.clone(), SymbolicValue::known(0_u64)),
                SymbolicValue::eq(left_byte.clone(), right_byte.clone()),
            ),
        );
        let difference = SymbolicValue::sub(left_byte.clone(), right_byte.clone());

        if state.must_be_true(&proceed)? {
            continue;
        }

        if !state.can_be_true(&proceed)? {
            let mut result = difference;
            for (proceed, difference) in pending.into_iter().rev() {
                result = SymbolicValue::ite(proceed, result, difference);
            }
            return Ok(result);
        }

        // An undecided offset involves at least one non-concrete byte;
        // pinning that byte is what lets a retry make progress if the scan
        // bound is hit.
        if undecided.is_none() {
            undecided = Some(if left_byte.as_known().is_none() {
                (left + offset, left_byte)
            } else {
                (right + offset, right_byte)
            });
        }

        pending.push((proceed, difference));
    }

    Err(scan_overrun(left, undecided, limit))
}

/// Runs `strcpy` from the string at `src` into the buffer at `dst`,
/// returning `dst` as the model's value.
///
/// Bytes up to and including the terminator are copied. Past a byte that
/// only *might* be the terminator, each destination byte becomes a
/// conditional between the copied byte and the destination's previous
/// content, guarded on no terminator having occurred yet.
///
/// # Errors
///
/// Returns [`Err`] if the scan bound is reached without a definite
/// terminator, or if an access faults.
pub fn strcpy<P>(state: &mut State<P>, dst: u64, src: u64) -> Result<BoxedVal, Interrupt>
where
    P: Platform,
{
    let limit = state.config().string_scan_limit;
    let mut copying: Option<BoxedVal> = None;
    let mut first_ambiguous: Option<(u64, BoxedVal)> = None;

    for offset in 0..limit {
        let offset = offset as u64;
        let byte = read_byte(state, src + offset)?;

        let stored = match &copying {
            None => byte.clone(),
            Some(guard) => {
                let previous = read_byte(state, dst + offset)?;
                SymbolicValue::ite(guard.clone(), byte.clone(), previous)
            }
        };
        write_byte(state, dst + offset, stored)?;

        match classify(state, &byte)? {
            ByteClass::DefinitelyZero => return Ok(SymbolicValue::known(dst)),
            ByteClass::DefinitelyNonzero => (),
            ByteClass::Ambiguous => {
                if first_ambiguous.is_none() {
                    first_ambiguous = Some((src + offset, byte.clone()));
                }
                let nonzero = SymbolicValue::ne(byte, SymbolicValue::known(0_u64));
                copying = Some(match copying {
                    None => nonzero,
                    Some(guard) => SymbolicValue::and(guard, nonzero),
                });
            }
        }
    }

    Err(scan_overrun(src, first_ambiguous, limit))
}

/// Builds the interrupt raised when a scan reaches its bound without the
/// string's shape being decided.
///
/// If an ambiguous byte was seen, the path can make progress once that
/// byte is concrete, so a fork on it is requested. Otherwise every scanned
/// byte was definitely nonzero and the path ends as a preserved test case.
fn scan_overrun(address: u64, first_ambiguous: Option<(u64, BoxedVal)>, limit: usize) -> Interrupt {
    match first_ambiguous {
        Some((byte_address, byte)) => Interrupt::Concretize(ConcretizationRequest::new(
            format!("Byte at 0x{byte_address:x} must be concrete to bound the string scan"),
            byte,
            Policy::All,
            WriteBack::Memory {
                address: byte_address,
                size:    1,
            },
        )),
        None => Interrupt::Terminate(Termination::new(
            format!("No string terminator found within {limit} bytes of 0x{address:x}"),
            true,
        )),
    }
}

/// Writes the single byte `value` at `address`, ending the path as a
/// preserved test case if the write faults.
fn write_byte<P>(state: &mut State<P>, address: u64, value: BoxedVal) -> Result<(), Interrupt>
where
    P: Platform,
{
    state
        .platform_mut()
        .write_bytes(address, &[value])
        .map_err(|payload| {
            Interrupt::Terminate(Termination::new(
                format!("Invalid memory access in call model: {payload}"),
                true,
            ))
        })
}

/// The call model for `strlen(s)`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Strlen;

impl<P> CallModel<P> for Strlen
where
    P: Platform,
{
    /// # Panics
    ///
    /// Panics if `args` holds fewer values than [`Self::arg_count`]
    /// requires; [`State::invoke_model`] checks this.
    fn invoke(&self, state: &mut State<P>, args: &[u64]) -> Result<BoxedVal, Interrupt> {
        strlen(state, args[0])
    }

    fn arg_count(&self) -> usize {
        1
    }

    fn as_text(&self) -> String {
        "strlen".into()
    }
}

/// The call model for `strcmp(s1, s2)`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Strcmp;

impl<P> CallModel<P> for Strcmp
where
    P: Platform,
{
    /// # Panics
    ///
    /// Panics if `args` holds fewer values than [`Self::arg_count`]
    /// requires; [`State::invoke_model`] checks this.
    fn invoke(&self, state: &mut State<P>, args: &[u64]) -> Result<BoxedVal, Interrupt> {
        strcmp(state, args[0], args[1])
    }

    fn arg_count(&self) -> usize {
        2
    }

    fn as_text(&self) -> String {
        "strcmp".into()
    }
}

/// The call model for `strcpy(dst, src)`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Strcpy;

impl<P> CallModel<P> for Strcpy
where
    P: Platform,
{
    /// # Panics
    ///
    /// Panics if `args` holds fewer values than [`Self::arg_count`]
    /// requires; [`State::invoke_model`] checks this.
    fn invoke(&self, state: &mut State<P>, args: &[u64]) -> Result<BoxedVal, Interrupt> {
        strcpy(state, args[0], args[1])
    }

    fn arg_count(&self) -> usize {
        2
    }

    fn as_text(&self) -> String {
        "strcpy".into()
    }
}
