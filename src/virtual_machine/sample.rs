use crate::virtual_machine::isa::Operation;
use crate::virtual_machine::operation_set::OperationSet;
use crate::virtual_machine::program::RawInstruction;
use crate::virtual_machine::registers::RegisterFile;

/// One observed execution step: registers before, the raw instruction, registers after.
///
/// Samples are read-only once built.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Sample {
    before: RegisterFile,
    instruction: RawInstruction,
    after: RegisterFile,
}

impl Sample {
    pub const fn new(before: RegisterFile, instruction: RawInstruction, after: RegisterFile) -> Self {
        Self {
            before,
            instruction,
            after,
        }
    }

    pub const fn before(&self) -> &RegisterFile {
        &self.before
    }

    pub const fn instruction(&self) -> &RawInstruction {
        &self.instruction
    }

    pub const fn after(&self) -> &RegisterFile {
        &self.after
    }

    pub const fn opcode(&self) -> u8 {
        self.instruction.opcode
    }

    /// Returns `true` if `op` turns `before` into exactly `after`.
    ///
    /// An operation that would touch a register outside the file never matches.
    pub fn matches(&self, op: Operation) -> bool {
        let RawInstruction { a, b, c, .. } = self.instruction;
        op.checked_apply(&self.before, a, b, c)
            .is_some_and(|out| out == self.after)
    }

    /// Returns every catalog operation consistent with this sample.
    pub fn consistent_operations(&self) -> OperationSet {
        self.consistent_among(OperationSet::all())
    }

    /// Returns the members of `candidates` consistent with this sample.
    pub fn consistent_among(&self, candidates: OperationSet) -> OperationSet {
        candidates.iter().filter(|op| self.matches(*op)).collect()
    }
}
