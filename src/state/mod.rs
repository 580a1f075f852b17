//! This module contains the execution state: one independent path through
//! the program under analysis, bundling a machine platform with the path
//! condition accumulated along it.
//!
//! The state owns the step protocol. It checkpoints the continuation
//! fields before every instruction, and on a recoverable signal rolls
//! itself back so the scheduler always receives a state positioned
//! *before* the instruction that raised the signal.

use crate::{
    constant::{
        DEFAULT_CONCRETIZATION_VALUE_LIMIT,
        DEFAULT_SAMPLED_VALUE_LIMIT,
        DEFAULT_STRING_SCAN_BYTES,
    },
    constraints::ConstraintSet,
    error,
    error::container::Locatable,
    models::CallModel,
    platform::{Platform, StepError, StepResult},
    signal::{ConcretizationRequest, Interrupt, Termination, WriteBack},
    solver::DynSolver,
    value::{BoxedVal, SymbolicValue},
};

/// The fields of the platform that the step protocol saves and restores.
///
/// Restoration destructures this completely, so adding a field here forces
/// every rollback site to account for it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CheckpointData {
    /// The program counter at the checkpoint.
    pub pc: u64,

    /// The previously executed instruction's program counter at the
    /// checkpoint.
    pub last_pc: u64,
}

/// The configuration for an execution state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// The maximum number of bytes a string model will scan before giving
    /// up on finding a terminator.
    pub string_scan_limit: usize,

    /// The maximum number of concrete values enumerated when forking under
    /// [`crate::signal::Policy::All`].
    pub concretization_value_limit: usize,

    /// The maximum number of concrete values enumerated when forking under
    /// [`crate::signal::Policy::Sampled`].
    pub sampled_value_limit: usize,
}

impl Config {
    /// Sets the string scan limit to `limit` bytes.
    #[must_use]
    pub fn with_string_scan_limit(mut self, limit: usize) -> Self {
        self.string_scan_limit = limit;
        self
    }

    /// Sets the maximum number of values enumerated for an exhaustive
    /// fork.
    #[must_use]
    pub fn with_concretization_value_limit(mut self, limit: usize) -> Self {
        self.concretization_value_limit = limit;
        self
    }

    /// Sets the maximum number of values enumerated for a sampled fork.
    #[must_use]
    pub fn with_sampled_value_limit(mut self, limit: usize) -> Self {
        self.sampled_value_limit = limit;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            string_scan_limit:          DEFAULT_STRING_SCAN_BYTES,
            concretization_value_limit: DEFAULT_CONCRETIZATION_VALUE_LIMIT,
            sampled_value_limit:        DEFAULT_SAMPLED_VALUE_LIMIT,
        }
    }
}

/// One independent execution path: a machine platform together with the
/// constraints that hold along it.
///
/// Cloning a state yields a fully independent path; nothing mutable is
/// shared between a state and its clones.
#[derive(Clone, Debug)]
pub struct State<P>
where
    P: Platform,
{
    /// The machine platform this path executes on.
    platform: P,

    /// The path condition: all constraints accumulated along this path.
    constraints: ConstraintSet,

    /// The solver used to answer queries about the path condition.
    solver: DynSolver,

    /// The configuration for this state.
    config: Config,

    /// The continuation fields as of the most recent checkpoint.
    checkpoint: CheckpointData,
}

impl<P> State<P>
where
    P: Platform,
{
    /// Constructs a new state over `platform`, answering queries through
    /// `solver` and configured by `config`.
    ///
    /// The initial checkpoint captures the platform as provided.
    #[must_use]
    pub fn new(platform: P, solver: DynSolver, config: Config) -> Self {
        let constraints = ConstraintSet::new();
        let checkpoint = CheckpointData {
            pc:      platform.pc(),
            last_pc: platform.last_pc(),
        };
        Self {
            platform,
            constraints,
            solver,
            config,
            checkpoint,
        }
    }

    /// Saves the platform's continuation fields so a failed step can be
    /// unwound.
    pub fn checkpoint(&mut self) {
        self.checkpoint = CheckpointData {
            pc:      self.platform.pc(),
            last_pc: self.platform.last_pc(),
        };
    }

    /// Restores the platform's continuation fields to the most recent
    /// checkpoint.
    pub fn rollback(&mut self) {
        let CheckpointData { pc, last_pc } = self.checkpoint;
        self.platform.set_pc(pc);
        self.platform.set_last_pc(last_pc);
    }

    /// Executes exactly one instruction on this state's platform.
    ///
    /// The continuation fields are checkpointed first. If the step raises
    /// a recoverable concretization signal, the state is rolled back to
    /// that checkpoint and the signal is reshaped into a uniform
    /// [`ConcretizationRequest`]. Internal failures also roll back, as they
    /// describe the engine rather than the explored path. A memory fault is
    /// deliberately *not* rolled back; the faulting state is the evidence.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] with the corresponding [`Interrupt`] if the
    /// instruction could not be completed.
    pub fn execute(&mut self) -> Result<StepResult, Interrupt> {
        self.checkpoint();

        match self.platform.step() {
            Ok(result) => Ok(result),
            Err(StepError::ConcretizeRegister { name, policy }) => {
                self.rollback();
                let expression = self
                    .platform
                    .read_register(&name)
                    .map_err(error::Error::from)?;

                Err(Interrupt::Concretize(ConcretizationRequest::new(
                    format!("Register {name} requires a concrete value"),
                    expression,
                    policy,
                    WriteBack::Register { name },
                )))
            }
            Err(StepError::ConcretizeMemory {
                address,
                size,
                policy,
            }) => {
                self.rollback();
                let expression = self
                    .platform
                    .read_int(address, size)
                    .map_err(error::Error::from)?;

                Err(Interrupt::Concretize(ConcretizationRequest::new(
                    format!("Memory at 0x{address:x} requires a concrete value"),
                    expression,
                    policy,
                    WriteBack::Memory { address, size },
                )))
            }
            Err(StepError::Concretize(request)) => {
                self.rollback();
                Err(Interrupt::Concretize(request))
            }
            Err(StepError::MemoryFault(payload)) => {
                let located = payload.locate(self.checkpoint.pc);
                Err(Interrupt::Terminate(Termination::new(
                    format!("Invalid memory access: {located}"),
                    true,
                )))
            }
            Err(StepError::Terminate(termination)) => Err(Interrupt::Terminate(termination)),
            Err(StepError::Internal(payload)) => {
                self.rollback();
                Err(Interrupt::Internal(payload))
            }
        }
    }

    /// Runs `model` against this state with the provided concrete
    /// argument values, returning the expression the modelled function
    /// evaluates to.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the argument count does not match the model's
    /// arity, or with whatever [`Interrupt`] the model raises.
    pub fn invoke_model(
        &mut self,
        model: &dyn CallModel<P>,
        args: &[u64],
    ) -> Result<BoxedVal, Interrupt> {
        if args.len() != model.arg_count() {
            let payload = error::model::Error::WrongArgumentCount {
                model:    model.as_text(),
                expected: model.arg_count(),
                actual:   args.len(),
            };
            return Err(Interrupt::Internal(payload.into()));
        }

        model.invoke(self, args)
    }

    /// Adds `constraint` to this path's condition.
    pub fn constrain(&mut self, constraint: BoxedVal) {
        self.constraints.add(constraint);
    }

    /// Checks whether `value` can be true under this path's condition.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the solver fails to answer the query.
    pub fn can_be_true(&self, value: &SymbolicValue) -> error::Result<bool> {
        Ok(self.solver.can_be_true(&self.constraints, value)?)
    }

    /// Checks whether `value` holds in every solution of this path's
    /// condition.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the solver fails to answer the query.
    pub fn must_be_true(&self, value: &SymbolicValue) -> error::Result<bool> {
        Ok(self.solver.must_be_true(&self.constraints, value)?)
    }

    /// Gets the state's platform.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Gets the state's platform for modification.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Gets this path's accumulated constraints.
    #[must_use]
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Gets this state's solver.
    #[must_use]
    pub fn solver(&self) -> &DynSolver {
        &self.solver
    }

    /// Gets this state's configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
