//! This module contains function-call models: summaries that replace a
//! call to a well-known library function with a direct symbolic
//! computation of its effect, avoiding instruction-level exploration of
//! the callee.

pub mod strings;

use std::fmt::Debug;

use downcast_rs::{impl_downcast, Downcast};

use crate::{
    error,
    platform::Platform,
    signal::{Interrupt, Termination},
    state::State,
    value::{BoxedVal, SymbolicValue},
};

/// What a path's constraints allow a single byte to be, relative to the
/// string terminator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ByteClass {
    /// The byte is zero in every solution of the path condition.
    DefinitelyZero,

    /// The byte is nonzero in every solution of the path condition.
    DefinitelyNonzero,

    /// Solutions exist with the byte zero and with it nonzero.
    Ambiguous,
}

/// Classifies `byte` against the path condition of `state`.
///
/// # Errors
///
/// Returns [`Err`] if the solver fails to answer the queries.
pub fn classify<P>(state: &State<P>, byte: &SymbolicValue) -> error::Result<ByteClass>
where
    P: Platform,
{
    let is_zero = SymbolicValue::eq(Box::new(byte.clone()), SymbolicValue::known(0_u64));

    if state.must_be_true(&is_zero)? {
        Ok(ByteClass::DefinitelyZero)
    } else if state.can_be_true(&is_zero)? {
        Ok(ByteClass::Ambiguous)
    } else {
        Ok(ByteClass::DefinitelyNonzero)
    }
}

/// The interface to a function-call model.
///
/// A model receives the state first, followed by the already concrete
/// argument values, and computes the expression the modelled function
/// returns. Models raise the same [`Interrupt`] vocabulary as
/// instruction-level execution, so the scheduler handles their signals
/// uniformly.
pub trait CallModel<P>
where
    Self: Debug + Downcast,
    P: Platform,
{
    /// Runs the model against `state` with the concrete `args`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] with an [`Interrupt`] if the model needs a
    /// concrete byte it cannot resolve, or if the path must end.
    fn invoke(&self, state: &mut State<P>, args: &[u64]) -> Result<BoxedVal, Interrupt>;

    /// The number of concrete arguments the model expects.
    fn arg_count(&self) -> usize;

    /// The name of the modelled function.
    fn as_text(&self) -> String;
}

impl_downcast!(CallModel<P> where P: Platform);

/// A dynamically dispatched [`CallModel`] instance.
pub type DynCallModel<P> = Box<dyn CallModel<P>>;

/// Reads the single byte at `address`, ending the path as a preserved
/// test case if the read faults.
fn read_byte<P>(state: &State<P>, address: u64) -> Result<BoxedVal, Interrupt>
where
    P: Platform,
{
    let mut bytes = state.platform().read_bytes(address, 1).map_err(|payload| {
        Interrupt::Terminate(Termination::new(
            format!("Invalid memory access in call model: {payload}"),
            true,
        ))
    })?;

    Ok(bytes.remove(0))
}

#[cfg(test)]
mod test {
    use super::{classify, ByteClass};
    use crate::{
        platform::{NopStepper, SymbolicPlatform},
        solver::EnumerationSolver,
        state::{Config, State},
        value::SymbolicValue,
    };

    fn new_state() -> State<SymbolicPlatform> {
        let platform = SymbolicPlatform::new(NopStepper::default().in_rc());
        State::new(platform, EnumerationSolver::new().in_rc(), Config::default())
    }

    #[test]
    fn concrete_bytes_classify_directly() -> anyhow::Result<()> {
        let state = new_state();

        assert_eq!(
            classify(&state, &SymbolicValue::known(0_u64))?,
            ByteClass::DefinitelyZero
        );
        assert_eq!(
            classify(&state, &SymbolicValue::known(0x61_u64))?,
            ByteClass::DefinitelyNonzero
        );

        Ok(())
    }

    #[test]
    fn classification_reflects_the_path_condition() -> anyhow::Result<()> {
        let mut state = new_state();
        let byte = SymbolicValue::unknown_byte();

        assert_eq!(classify(&state, &byte)?, ByteClass::Ambiguous);

        state.constrain(SymbolicValue::eq(
            byte.clone(),
            SymbolicValue::known(0x41_u64),
        ));
        assert_eq!(classify(&state, &byte)?, ByteClass::DefinitelyNonzero);

        Ok(())
    }
}
