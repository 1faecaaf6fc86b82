//! Register VM library.
//!
//! Deduces an ambiguous opcode encoding from observed samples and executes
//! programs, either through the deduced bindings or with the instruction
//! pointer bound to a register.

pub mod utils;
pub mod virtual_machine;
