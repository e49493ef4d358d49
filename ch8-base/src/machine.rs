use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    display::Display,
    instruction::{Instruction, InvalidOpcodeError, Opcode},
    memory::{AddressOutOfRangeError, Memory},
};

mod call_stack;
mod data_register;
mod key;
mod ops;
mod state;

pub use call_stack::{CallStack, CallStackOverflowError, StackPointerOutOfRangeError};
pub use data_register::DataRegister;
pub use key::{Key, KeyState, Keypad};
pub use state::MachineState;

use ops::Advance;

/// Reason an instruction could not be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("memory access at {address:X} is out of range")]
    MemoryOutOfRange { address: usize },
    #[error("call exceeds the maximum call stack depth of {}", CallStack::DEPTH)]
    StackOverflow,
    #[error("return with an empty call stack")]
    StackUnderflow,
    #[error("key {key:X} does not exist (greater than 0xF)")]
    InvalidKey { key: u8 },
    #[error("opcode does not encode an instruction")]
    InvalidOpcode,
    #[error("machine code routines are unsupported")]
    MachineCall,
}

impl From<AddressOutOfRangeError> for Fault {
    fn from(error: AddressOutOfRangeError) -> Self {
        Self::MemoryOutOfRange {
            address: error.first_invalid_address(),
        }
    }
}

/// Fatal errors of a machine. After one of these the machine should not be run further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("the instruction at {program_counter:X} lies outside of memory")]
    ProgramCounterOutOfRange { program_counter: u16 },
    #[error("{fault} (opcode {opcode:04X} at {program_counter:03X})")]
    Fault {
        fault: Fault,
        opcode: u16,
        program_counter: u16,
    },
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error(
        "a program with a length ({program_len:X}) greater than the usable length of memory ({:X}) was supplied",
        Memory::MAX_PROGRAM_LEN
    )]
    ProgramTooLarge { program_len: usize },
}

/// What to do with opcodes that don't encode any instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidOpcodePolicy {
    /// Log the opcode and continue with the next instruction.
    Skip,
    /// Stop with [`Fault::InvalidOpcode`].
    Halt,
}

impl Default for InvalidOpcodePolicy {
    fn default() -> Self {
        Self::Skip
    }
}

/// What to do with [`Instruction::MachineCall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineCallPolicy {
    /// Treat it as a no-op.
    Skip,
    /// Stop with [`Fault::MachineCall`].
    Reject,
}

impl Default for MachineCallPolicy {
    fn default() -> Self {
        Self::Skip
    }
}

/// When the delay and sound timers count down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Only when the driver calls [`Machine::tick_timers`], usually at 60 Hz.
    External,
    /// Once after every cycle in addition to [`Machine::tick_timers`].
    ///
    /// Couples timer speed to instruction throughput. Some old interpreters behave like this.
    PerCycle,
}

impl Default for TimerMode {
    fn default() -> Self {
        Self::External
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub invalid_opcodes: InvalidOpcodePolicy,
    pub machine_calls: MachineCallPolicy,
    pub timer_mode: TimerMode,
}

/// Outcome of a single [`Machine::run_cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed(Instruction),
    /// `Fx0A` found no pressed key, the program counter was left as is.
    WaitingForKey,
    /// The opcode didn't encode an instruction and was stepped over.
    SkippedInvalid(u16),
}

/// A CHIP-8 machine.
///
/// The driver calls [`Machine::run_cycle`] at whatever rate it likes,
/// [`Machine::tick_timers`] at 60 Hz and updates the keypad in between.
#[derive(Debug, Clone)]
pub struct Machine {
    state: MachineState,
    rng: StdRng,
    options: Options,
}

impl Default for Machine {
    fn default() -> Self {
        MachineBuilder::new().build()
    }
}

impl Machine {
    pub fn builder() -> MachineBuilder {
        MachineBuilder::new()
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> MachineState {
        self.state.clone()
    }

    /// Replace the current state, e.g. with an earlier [`Machine::snapshot`].
    /// The random source keeps running where it is.
    pub fn restore(&mut self, state: MachineState) {
        self.state = state;
    }

    pub fn display(&self) -> &Display {
        &self.state.display
    }

    pub fn press(&mut self, key: Key) {
        self.state.keypad.set(key, KeyState::Pressed);
    }

    pub fn release(&mut self, key: Key) {
        self.state.keypad.set(key, KeyState::NotPressed);
    }

    /// Whether a tone should currently be playing.
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// Count the delay and sound timers down by one. Neither goes below zero.
    pub fn tick_timers(&mut self) {
        self.state.tick_timers();
    }

    fn fetch(&self) -> Result<Opcode, MachineError> {
        let program_counter = self.state.program_counter;
        match self.state.memory.slice(program_counter as usize, 2) {
            Ok(&[high, low]) => Ok(Opcode::from_bytes(high, low)),
            _ => Err(MachineError::ProgramCounterOutOfRange { program_counter }),
        }
    }

    /// Fetch, decode and execute the instruction at the program counter.
    #[tracing::instrument(level = "trace", skip(self), fields(pc = self.state.program_counter))]
    pub fn run_cycle(&mut self) -> Result<Step, MachineError> {
        let program_counter = self.state.program_counter;
        let opcode = self.fetch()?;
        self.state.opcode = opcode.0;

        let fault = |fault: Fault| MachineError::Fault {
            fault,
            opcode: opcode.0,
            program_counter,
        };

        let step = match Instruction::try_from(opcode) {
            Ok(instruction) => {
                trace!(opcode = opcode.0, %instruction, "executing");
                let advance =
                    ops::execute(&mut self.state, &mut self.rng, &self.options, instruction)
                        .map_err(fault)?;
                self.state.program_counter = advance.apply(program_counter);

                if advance == Advance::Stay {
                    debug!(%instruction, "waiting for a key press");
                    Step::WaitingForKey
                } else {
                    Step::Executed(instruction)
                }
            }
            Err(InvalidOpcodeError(word)) => match self.options.invalid_opcodes {
                InvalidOpcodePolicy::Skip => {
                    warn!(opcode = word, program_counter, "skipping invalid opcode");
                    self.state.program_counter = Advance::Next.apply(program_counter);
                    Step::SkippedInvalid(word)
                }
                InvalidOpcodePolicy::Halt => return Err(fault(Fault::InvalidOpcode)),
            },
        };

        if self.options.timer_mode == TimerMode::PerCycle {
            self.state.tick_timers();
        }

        Ok(step)
    }
}

pub struct MachineBuilder {
    /// The partially initialized state
    state: MachineState,
    seed: Option<u64>,
    options: Options,
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self {
            state: MachineState::default(),
            seed: None,
            options: Options::default(),
        }
    }

    /// Copy a program image into memory starting at [`Memory::PROGRAM_START`].
    pub fn program(mut self, program: &[u8]) -> Result<Self, BuilderError> {
        let target = self
            .state
            .memory
            .slice_mut(Memory::PROGRAM_START as usize, program.len())
            .map_err(|_| BuilderError::ProgramTooLarge {
                program_len: program.len(),
            })?;
        target.copy_from_slice(program);

        Ok(self)
    }

    /// Seed the random source of [`Instruction::Random`] for reproducible runs.
    /// Unseeded machines draw their seed from the operating system.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn invalid_opcodes(mut self, policy: InvalidOpcodePolicy) -> Self {
        self.options.invalid_opcodes = policy;
        self
    }

    pub fn machine_calls(mut self, policy: MachineCallPolicy) -> Self {
        self.options.machine_calls = policy;
        self
    }

    pub fn timer_mode(mut self, mode: TimerMode) -> Self {
        self.options.timer_mode = mode;
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Machine {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Machine {
            state: self.state,
            rng,
            options: self.options,
        }
    }
}
