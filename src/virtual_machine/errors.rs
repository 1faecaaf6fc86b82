use regvm_derive::Error;

/// Errors raised while deducing opcode bindings or executing programs.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum VMError {
    /// The evidence for an opcode leaves no catalog operation standing.
    #[error("opcode {opcode} has no consistent operation (sample {sample})")]
    NoConsistentOperation { opcode: u8, sample: usize },
    /// Solving finished with an opcode whose candidate set is not a single operation.
    #[error("opcode {opcode} is ambiguous: {candidates} candidate operations remain")]
    AmbiguousBinding { opcode: u8, candidates: usize },
    /// An opcode number does not fit in a byte.
    #[error("opcode {0} does not fit in a byte")]
    InvalidOpcode(u64),
    /// Plain-mode execution met an opcode with no binding.
    #[error("unbound opcode {opcode} at instruction {index}")]
    UnboundOpcode { opcode: u8, index: usize },
    /// A configured register index exceeds the register file size.
    #[error("register index {index} out of bounds ({available} registers)")]
    InvalidRegisterIndex { index: usize, available: usize },
    /// Unrecognized operation mnemonic.
    #[error("invalid operation name: {0}")]
    InvalidOperationName(String),
    /// The operation is already bound to a different opcode.
    #[error("operation {operation} is already bound to opcode {opcode}")]
    DuplicateBinding {
        operation: &'static str,
        opcode: u8,
    },
    /// The opcode already has a binding.
    #[error("opcode {opcode} is already bound")]
    OpcodeAlreadyBound { opcode: u8 },
}
