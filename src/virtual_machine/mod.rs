//! Register virtual machine with deduced opcode bindings.
//!
//! # Architecture
//!
//! - **Registers**: fixed-width files of `u64` ([`registers::RegisterFile`] has 4,
//!   [`registers::DeviceRegisters`] has 6)
//! - **Catalog**: 16 operations reading two operands (register, immediate or
//!   ignored) and writing register `c`
//! - **Evidence**: [`sample::Sample`]s record one observed step under an
//!   unknown opcode number
//! - **Solving**: [`solver::solve_bindings`] turns samples into a
//!   [`solver::BindingTable`]
//! - **Execution**: [`vm::execute_plain`] runs raw programs through a binding
//!   table; [`vm::execute_ip_bound`] runs named programs with the instruction
//!   pointer bound to a register, optionally watching a checkpoint for cycles
//!
//! # Modules
//!
//! - [`diagnostics`]: Per-sample ambiguity counts
//! - [`errors`]: Solving and execution error types
//! - [`isa`]: Operation catalog
//! - [`operation_set`]: Compact sets of operations
//! - [`program`]: Raw and named instructions
//! - [`registers`]: Register files
//! - [`sample`]: Observed execution steps
//! - [`solver`]: Opcode binding solver
//! - [`vm`]: Execution engine

pub mod diagnostics;
pub mod errors;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod operation_set;
pub mod program;
pub mod registers;
pub mod sample;
pub mod solver;
pub mod vm;
