//! Operation catalog.
//!
//! The [`for_each_operation!`](crate::for_each_operation) macro holds the
//! canonical table of the 16 register operations and hands it to a callback
//! macro, so the enum, its dispatch and the catalog hash check are all
//! generated from one list.
//!
//! Every operation reads operand `a` and `b` as a register, an immediate value
//! or not at all, combines the two values and writes the result into register
//! `c`. Comparisons write `1` for true and `0` for false. Arithmetic wraps.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::registers::Registers;
use std::fmt;
use std::str::FromStr;

/// How an instruction operand is interpreted by an operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OperandKind {
    /// The operand names a register whose value is read.
    Reg,
    /// The operand is used as a literal value.
    Imm,
    /// The operand is not read.
    Ignored,
}

/// Invokes a callback macro with the complete operation table.
///
/// Columns: variant = tag, mnemonic => (kind of `a`, kind of `b`), combiner.
#[macro_export]
macro_rules! for_each_operation {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Arithmetic
            // =========================
            /// ADDR a, b, c ; rc = ra + rb
            Addr = 0, "addr" => (Reg, Reg), |x, y| x.wrapping_add(y),
            /// ADDI a, b, c ; rc = ra + b
            Addi = 1, "addi" => (Reg, Imm), |x, y| x.wrapping_add(y),
            /// MULR a, b, c ; rc = ra * rb
            Mulr = 2, "mulr" => (Reg, Reg), |x, y| x.wrapping_mul(y),
            /// MULI a, b, c ; rc = ra * b
            Muli = 3, "muli" => (Reg, Imm), |x, y| x.wrapping_mul(y),
            // =========================
            // Bitwise
            // =========================
            /// BANR a, b, c ; rc = ra & rb
            Banr = 4, "banr" => (Reg, Reg), |x, y| x & y,
            /// BANI a, b, c ; rc = ra & b
            Bani = 5, "bani" => (Reg, Imm), |x, y| x & y,
            /// BORR a, b, c ; rc = ra | rb
            Borr = 6, "borr" => (Reg, Reg), |x, y| x | y,
            /// BORI a, b, c ; rc = ra | b
            Bori = 7, "bori" => (Reg, Imm), |x, y| x | y,
            // =========================
            // Assignment
            // =========================
            /// SETR a, _, c ; rc = ra
            Setr = 8, "setr" => (Reg, Ignored), |x, _| x,
            /// SETI a, _, c ; rc = a
            Seti = 9, "seti" => (Imm, Ignored), |x, _| x,
            // =========================
            // Comparison
            // =========================
            /// GTIR a, b, c ; rc = (a > rb)
            Gtir = 10, "gtir" => (Imm, Reg), |x, y| u64::from(x > y),
            /// GTRI a, b, c ; rc = (ra > b)
            Gtri = 11, "gtri" => (Reg, Imm), |x, y| u64::from(x > y),
            /// GTRR a, b, c ; rc = (ra > rb)
            Gtrr = 12, "gtrr" => (Reg, Reg), |x, y| u64::from(x > y),
            /// EQIR a, b, c ; rc = (a == rb)
            Eqir = 13, "eqir" => (Imm, Reg), |x, y| u64::from(x == y),
            /// EQRI a, b, c ; rc = (ra == b)
            Eqri = 14, "eqri" => (Reg, Imm), |x, y| u64::from(x == y),
            /// EQRR a, b, c ; rc = (ra == rb)
            Eqrr = 15, "eqrr" => (Reg, Reg), |x, y| u64::from(x == y),
        }
    };
}

#[macro_export]
macro_rules! define_operations {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $tag:expr, $mnemonic:literal => ($a_kind:ident, $b_kind:ident), $combine:expr
        ),* $(,)?
    ) => {
        /// One of the fixed register operations.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(u8)]
        pub enum Operation {
            $(
                $(#[$doc])*
                $name = $tag,
            )*
        }

        impl Operation {
            /// The whole catalog in tag order.
            pub const ALL: [Operation; OPERATION_COUNT] = [ $( Operation::$name, )* ];

            /// Returns the mnemonic for this operation.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Operation::$name => $mnemonic, )*
                }
            }

            /// Returns how operands `a` and `b` are interpreted.
            pub const fn operand_kinds(&self) -> (OperandKind, OperandKind) {
                match self {
                    $( Operation::$name => (OperandKind::$a_kind, OperandKind::$b_kind), )*
                }
            }

            fn combiner(&self) -> fn(u64, u64) -> u64 {
                match self {
                    $( Operation::$name => $combine, )*
                }
            }
        }

        impl FromStr for Operation {
            type Err = VMError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $mnemonic => Ok(Operation::$name), )*
                    _ => Err(VMError::InvalidOperationName(s.to_string())),
                }
            }
        }
    };
}

/// Number of operations in the catalog.
pub const OPERATION_COUNT: usize = 16;

for_each_operation!(define_operations);

impl Operation {
    /// Applies the operation to a copy of `registers`.
    ///
    /// Returns `None` if a register operand, including the target `c`, does
    /// not name a register of the file. The input file is never modified.
    pub fn checked_apply<const N: usize>(
        &self,
        registers: &Registers<N>,
        a: u64,
        b: u64,
        c: u64,
    ) -> Option<Registers<N>> {
        let (a_kind, b_kind) = self.operand_kinds();
        let lhs = read_operand(registers, a_kind, a)?;
        let rhs = read_operand(registers, b_kind, b)?;
        let mut out = *registers;
        out.try_set(c, (self.combiner())(lhs, rhs))?;
        Some(out)
    }

    /// Applies the operation to a copy of `registers`.
    ///
    /// Programs are assumed well-formed: every register operand must name a
    /// register of the file.
    ///
    /// # Panics
    ///
    /// Panics if a register operand is out of range.
    pub fn apply<const N: usize>(
        &self,
        registers: &Registers<N>,
        a: u64,
        b: u64,
        c: u64,
    ) -> Registers<N> {
        match self.checked_apply(registers, a, b, c) {
            Some(out) => out,
            None => panic!(
                "{} {} {} {}: register operand out of range for {} registers",
                self.mnemonic(),
                a,
                b,
                c,
                N
            ),
        }
    }
}

fn read_operand<const N: usize>(
    registers: &Registers<N>,
    kind: OperandKind,
    operand: u64,
) -> Option<u64> {
    match kind {
        OperandKind::Reg => registers.try_get(operand),
        OperandKind::Imm => Some(operand),
        OperandKind::Ignored => Some(0),
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_machine::registers::{DeviceRegisters, RegisterFile};

    fn run(op: Operation, before: [u64; 4], a: u64, b: u64, c: u64) -> [u64; 4] {
        op.apply(&RegisterFile::new(before), a, b, c).into_inner()
    }

    #[test]
    fn catalog_is_in_tag_order() {
        for (i, op) in Operation::ALL.iter().enumerate() {
            assert_eq!(*op as usize, i);
        }
    }

    #[test]
    fn mnemonic_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.mnemonic().parse::<Operation>(), Ok(op));
            assert_eq!(op.to_string(), op.mnemonic());
        }
    }

    #[test]
    fn unknown_mnemonic() {
        assert_eq!(
            "divr".parse::<Operation>(),
            Err(VMError::InvalidOperationName("divr".into()))
        );
        assert!("ADDR".parse::<Operation>().is_err());
    }

    // ==================== Arithmetic ====================

    #[test]
    fn addr() {
        assert_eq!(run(Operation::Addr, [3, 2, 1, 1], 2, 1, 2), [3, 2, 3, 1]);
    }

    #[test]
    fn addi() {
        assert_eq!(run(Operation::Addi, [3, 2, 1, 1], 0, 7, 3), [3, 2, 1, 10]);
    }

    #[test]
    fn add_wraps() {
        assert_eq!(run(Operation::Addi, [u64::MAX, 0, 0, 0], 0, 2, 1), [u64::MAX, 1, 0, 0]);
    }

    #[test]
    fn mulr() {
        assert_eq!(run(Operation::Mulr, [3, 2, 1, 1], 2, 1, 2), [3, 2, 2, 1]);
    }

    #[test]
    fn muli() {
        assert_eq!(run(Operation::Muli, [3, 2, 1, 1], 0, 5, 0), [15, 2, 1, 1]);
    }

    // ==================== Bitwise ====================

    #[test]
    fn banr_and_bani() {
        assert_eq!(run(Operation::Banr, [12, 10, 0, 0], 0, 1, 2), [12, 10, 8, 0]);
        assert_eq!(run(Operation::Bani, [12, 10, 0, 0], 0, 6, 3), [12, 10, 0, 4]);
    }

    #[test]
    fn borr_and_bori() {
        assert_eq!(run(Operation::Borr, [12, 10, 0, 0], 0, 1, 2), [12, 10, 14, 0]);
        assert_eq!(run(Operation::Bori, [12, 10, 0, 0], 1, 1, 3), [12, 10, 0, 11]);
    }

    // ==================== Assignment ====================

    #[test]
    fn setr_ignores_b() {
        assert_eq!(run(Operation::Setr, [3, 2, 1, 1], 0, 99, 2), [3, 2, 3, 1]);
    }

    #[test]
    fn seti_uses_literal_a() {
        assert_eq!(run(Operation::Seti, [3, 2, 1, 1], 2, 99, 0), [2, 2, 1, 1]);
    }

    // ==================== Comparison ====================

    #[test]
    fn greater_than_variants() {
        assert_eq!(run(Operation::Gtir, [0, 4, 0, 9], 5, 1, 3), [0, 4, 0, 1]);
        assert_eq!(run(Operation::Gtir, [0, 5, 0, 9], 5, 1, 3), [0, 5, 0, 0]);
        assert_eq!(run(Operation::Gtri, [6, 0, 0, 9], 0, 5, 3), [6, 0, 0, 1]);
        assert_eq!(run(Operation::Gtrr, [6, 7, 0, 9], 0, 1, 3), [6, 7, 0, 0]);
    }

    #[test]
    fn equality_variants() {
        assert_eq!(run(Operation::Eqir, [0, 4, 0, 9], 4, 1, 3), [0, 4, 0, 1]);
        assert_eq!(run(Operation::Eqri, [6, 0, 0, 9], 0, 5, 3), [6, 0, 0, 0]);
        assert_eq!(run(Operation::Eqrr, [7, 7, 0, 9], 0, 1, 3), [7, 7, 0, 1]);
    }

    #[test]
    fn comparison_result_is_stable_under_repetition() {
        let before = RegisterFile::new([7, 7, 0, 0]);
        let once = Operation::Eqrr.apply(&before, 0, 1, 2);
        let twice = Operation::Eqrr.apply(&once, 0, 1, 2);
        assert_eq!(once, twice);
        assert_eq!(twice.get(2), 1);
    }

    // ==================== Operands ====================

    #[test]
    fn operand_kinds() {
        assert_eq!(Operation::Addi.operand_kinds(), (OperandKind::Reg, OperandKind::Imm));
        assert_eq!(Operation::Seti.operand_kinds(), (OperandKind::Imm, OperandKind::Ignored));
        assert_eq!(Operation::Gtir.operand_kinds(), (OperandKind::Imm, OperandKind::Reg));
    }

    #[test]
    fn checked_apply_rejects_missing_registers() {
        let regs = RegisterFile::new([1, 2, 3, 4]);
        assert_eq!(Operation::Addr.checked_apply(&regs, 4, 0, 0), None);
        assert_eq!(Operation::Addr.checked_apply(&regs, 0, 0, 4), None);
        // Immediate operands may hold any value.
        assert!(Operation::Seti.checked_apply(&regs, 1000, 1000, 0).is_some());
    }

    #[test]
    fn apply_leaves_input_untouched() {
        let regs = RegisterFile::new([1, 2, 3, 4]);
        let _ = Operation::Seti.apply(&regs, 9, 0, 0);
        assert_eq!(regs, RegisterFile::new([1, 2, 3, 4]));
    }

    #[test]
    fn wider_register_files() {
        let regs = DeviceRegisters::new([0, 0, 0, 0, 0, 5]);
        let out = Operation::Addi.apply(&regs, 5, 1, 4);
        assert_eq!(out.into_inner(), [0, 0, 0, 0, 6, 5]);
    }

    #[test]
    #[should_panic(expected = "register operand out of range")]
    fn apply_panics_on_missing_register() {
        Operation::Setr.apply(&RegisterFile::zeroed(), 4, 0, 0);
    }
}
