//! Execution engine.
//!
//! Two modes run programs against a register file:
//!
//! - **Plain**: raw instructions run in order, each opcode resolved through a
//!   [`BindingTable`]. The run ends at the end of the program.
//! - **Instruction-pointer-bound**: one register holds the index of the next
//!   instruction. Before each step that register is read to fetch the
//!   instruction; after the instruction runs it is incremented by one, so an
//!   instruction writing to it performs a relative jump. The run ends when the
//!   index leaves the program, or when a watched [`Checkpoint`] sees a value
//!   for the second time.
//!
//! Programs are assumed well-formed: a register operand that does not name a
//! register of the file panics (see [`Operation::apply`](super::isa::Operation::apply)).

mod checkpoint;

pub use checkpoint::{Checkpoint, CheckpointReport};

use crate::{error, info};
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::program::{Instruction, RawInstruction};
use crate::virtual_machine::registers::Registers;
use crate::virtual_machine::solver::BindingTable;
use checkpoint::{CheckpointMonitor, Observation};

/// Runs `program` in order, resolving every opcode through `bindings`.
///
/// Returns [`VMError::UnboundOpcode`] for the first instruction whose opcode
/// has no binding; nothing after it runs.
pub fn execute_plain<const N: usize>(
    program: &[RawInstruction],
    bindings: &BindingTable,
    initial: Registers<N>,
) -> Result<Registers<N>, VMError> {
    program
        .iter()
        .enumerate()
        .try_fold(initial, |registers, (index, raw)| {
            let op = bindings.get(raw.opcode).ok_or_else(|| {
                let e = VMError::UnboundOpcode {
                    opcode: raw.opcode,
                    index,
                };
                error!("plain run aborted: {e}");
                e
            })?;
            Ok(raw.bind(op).execute(&registers))
        })
}

/// Lifecycle of an instruction-pointer-bound run. Both halted states are final.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RunState {
    Running,
    /// The instruction pointer left `[0, program length)`.
    HaltedByBounds,
    /// The checkpoint register repeated a value at the checkpoint instruction.
    HaltedByCycleRepeat,
}

impl RunState {
    pub const fn is_halted(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

/// Result of an instruction-pointer-bound run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IpBoundOutcome<const N: usize> {
    /// Registers at the moment the run halted.
    pub registers: Registers<N>,
    /// How the run halted.
    pub state: RunState,
    /// Number of instructions executed.
    pub steps: u64,
    /// Checkpoint values, if a checkpoint was watched and reached at least once.
    pub checkpoint: Option<CheckpointReport>,
}

impl<const N: usize> IpBoundOutcome<N> {
    /// Returns `(first_seen, last_distinct)` from the checkpoint report.
    pub fn checkpoint_values(&self) -> Option<(u64, u64)> {
        self.checkpoint
            .map(|report| (report.first_seen, report.last_distinct))
    }
}

/// Virtual machine whose instruction pointer lives in a register.
pub struct IpBoundVm<'a, const N: usize> {
    /// Instructions to execute.
    program: &'a [Instruction],
    /// Register bound to the instruction pointer.
    ip_register: usize,
    /// Register file (`N` registers).
    registers: Registers<N>,
    /// Checkpoint seen-set, when watching one.
    monitor: Option<CheckpointMonitor>,
    /// Log every executed instruction.
    trace: bool,
    state: RunState,
    steps: u64,
}

impl<'a, const N: usize> IpBoundVm<'a, N> {
    /// Creates a VM with the instruction pointer bound to `ip_register`.
    ///
    /// Returns [`VMError::InvalidRegisterIndex`] if `ip_register >= N`.
    pub fn new(
        program: &'a [Instruction],
        ip_register: usize,
        initial: Registers<N>,
    ) -> Result<Self, VMError> {
        check_register::<N>(ip_register)?;
        Ok(Self {
            program,
            ip_register,
            registers: initial,
            monitor: None,
            trace: false,
            state: RunState::Running,
            steps: 0,
        })
    }

    /// Watches `checkpoint` for the rest of the run.
    ///
    /// Returns [`VMError::InvalidRegisterIndex`] if the checkpoint register
    /// does not exist.
    pub fn with_checkpoint(mut self, checkpoint: Checkpoint) -> Result<Self, VMError> {
        check_register::<N>(checkpoint.register)?;
        self.monitor = Some(CheckpointMonitor::new(checkpoint));
        Ok(self)
    }

    /// Logs each executed instruction with the registers before and after it.
    ///
    /// Tracing never changes the outcome of a run.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn registers(&self) -> &Registers<N> {
        &self.registers
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Current value of the instruction pointer register.
    pub fn ip(&self) -> u64 {
        self.registers.get(self.ip_register)
    }

    /// Executes one instruction, or halts if a halt condition holds.
    ///
    /// Calling `step` on a halted VM does nothing.
    pub fn step(&mut self) -> RunState {
        if self.state.is_halted() {
            return self.state;
        }

        let Some(index) = self.fetch_index() else {
            self.state = RunState::HaltedByBounds;
            return self.state;
        };

        if let Some(monitor) = &mut self.monitor {
            let checkpoint = monitor.checkpoint();
            if checkpoint.instruction == index
                && monitor.observe(self.registers.get(checkpoint.register)) == Observation::Repeat
            {
                self.state = RunState::HaltedByCycleRepeat;
                return self.state;
            }
        }

        let instruction = self.program[index];
        let mut next = instruction.execute(&self.registers);
        if self.trace {
            info!("{}", self.trace_line(&instruction, &next));
        }
        let ip = next.get(self.ip_register).wrapping_add(1);
        next.set(self.ip_register, ip);
        self.registers = next;
        self.steps += 1;

        self.state
    }

    /// Runs until a halt condition holds.
    ///
    /// Without a checkpoint a program that loops forever never returns.
    pub fn run(mut self) -> IpBoundOutcome<N> {
        while !self.step().is_halted() {}

        match self.state {
            RunState::HaltedByCycleRepeat => info!(
                "checkpoint value repeated after {} steps, registers {}",
                self.steps, self.registers
            ),
            _ => info!(
                "instruction pointer {} left the program after {} steps",
                self.ip(),
                self.steps
            ),
        }

        IpBoundOutcome {
            registers: self.registers,
            state: self.state,
            steps: self.steps,
            checkpoint: self.monitor.as_ref().and_then(CheckpointMonitor::report),
        }
    }

    /// `ip=<ip register> <before> <instruction> <after>`, where `after` is
    /// taken before the instruction pointer is incremented.
    fn trace_line(&self, instruction: &Instruction, after: &Registers<N>) -> String {
        format!(
            "ip={} {} {} {}",
            self.ip_register, self.registers, instruction, after
        )
    }

    /// Index of the next instruction, if the instruction pointer is inside the program.
    fn fetch_index(&self) -> Option<usize> {
        usize::try_from(self.ip())
            .ok()
            .filter(|&index| index < self.program.len())
    }
}

fn check_register<const N: usize>(index: usize) -> Result<(), VMError> {
    if index < N {
        Ok(())
    } else {
        Err(VMError::InvalidRegisterIndex {
            index,
            available: N,
        })
    }
}

/// Runs `program` with the instruction pointer bound to `ip_register`.
///
/// With a `checkpoint`, the run also stops the first time the checkpoint
/// register shows a value it already showed at the checkpoint instruction,
/// and the outcome reports the first and last distinct values seen there.
pub fn execute_ip_bound<const N: usize>(
    program: &[Instruction],
    ip_register: usize,
    initial: Registers<N>,
    checkpoint: Option<Checkpoint>,
) -> Result<IpBoundOutcome<N>, VMError> {
    let vm = IpBoundVm::new(program, ip_register, initial)?;
    let vm = match checkpoint {
        Some(checkpoint) => vm.with_checkpoint(checkpoint)?,
        None => vm,
    };
    Ok(vm.run())
}
