//! Instruction and program representation.
//!
//! A [`RawInstruction`] carries an opaque opcode number that only gains a
//! meaning once a [`BindingTable`](super::solver::BindingTable) exists. An
//! [`Instruction`] names its [`Operation`] directly and is what
//! instruction-pointer-bound programs are made of.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::Operation;
use crate::virtual_machine::registers::Registers;
use std::fmt;

/// Instruction whose opcode has not been bound to an operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RawInstruction {
    pub opcode: u8,
    pub a: u64,
    pub b: u64,
    pub c: u64,
}

impl RawInstruction {
    pub const fn new(opcode: u8, a: u64, b: u64, c: u64) -> Self {
        Self { opcode, a, b, c }
    }

    /// Resolves the opcode into a named instruction.
    pub const fn bind(&self, op: Operation) -> Instruction {
        Instruction::new(op, self.a, self.b, self.c)
    }
}

impl TryFrom<[u64; 4]> for RawInstruction {
    type Error = VMError;

    /// Builds an instruction from `[opcode, a, b, c]`. The opcode must fit in a byte.
    fn try_from([opcode, a, b, c]: [u64; 4]) -> Result<Self, Self::Error> {
        let opcode = u8::try_from(opcode).map_err(|_| VMError::InvalidOpcode(opcode))?;
        Ok(Self::new(opcode, a, b, c))
    }
}

impl fmt::Display for RawInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.opcode, self.a, self.b, self.c)
    }
}

/// Instruction with a known operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
    pub op: Operation,
    pub a: u64,
    pub b: u64,
    pub c: u64,
}

impl Instruction {
    pub const fn new(op: Operation, a: u64, b: u64, c: u64) -> Self {
        Self { op, a, b, c }
    }

    /// Executes the instruction on a copy of `registers`.
    ///
    /// # Panics
    ///
    /// Panics if a register operand is out of range (see [`Operation::apply`]).
    pub fn execute<const N: usize>(&self, registers: &Registers<N>) -> Registers<N> {
        self.op.apply(registers, self.a, self.b, self.c)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.op, self.a, self.b, self.c)
    }
}
