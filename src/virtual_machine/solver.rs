//! Opcode binding solver.
//!
//! Deduces which catalog [`Operation`] each opaque opcode number stands for by
//! intersecting the operations consistent with every sample of that opcode.
//! As soon as an opcode is down to a single candidate it is bound, and the
//! operation is struck from every other opcode's candidates, which may bind
//! those in turn.
//!
//! Once an opcode is bound its later samples are skipped without being
//! checked against the binding.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::Operation;
use crate::virtual_machine::operation_set::OperationSet;
use crate::virtual_machine::sample::Sample;
use crate::{info, warn};
use std::collections::BTreeMap;
use std::fmt;

/// Resolved opcode → operation mapping.
///
/// No operation is ever bound to two opcodes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BindingTable {
    by_opcode: BTreeMap<u8, Operation>,
    by_operation: BTreeMap<Operation, u8>,
}

impl BindingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from explicit `(opcode, operation)` pairs.
    pub fn from_pairs(pairs: &[(u8, Operation)]) -> Result<Self, VMError> {
        let mut table = Self::new();
        for &(opcode, op) in pairs {
            table.insert(opcode, op)?;
        }
        Ok(table)
    }

    /// Binds `opcode` to `op`.
    ///
    /// Fails if the opcode already has a binding or the operation is already
    /// bound to another opcode.
    pub fn insert(&mut self, opcode: u8, op: Operation) -> Result<(), VMError> {
        if self.by_opcode.contains_key(&opcode) {
            return Err(VMError::OpcodeAlreadyBound { opcode });
        }
        if let Some(&existing) = self.by_operation.get(&op) {
            return Err(VMError::DuplicateBinding {
                operation: op.mnemonic(),
                opcode: existing,
            });
        }
        self.by_opcode.insert(opcode, op);
        self.by_operation.insert(op, opcode);
        Ok(())
    }

    /// Returns the operation bound to `opcode`.
    pub fn get(&self, opcode: u8) -> Option<Operation> {
        self.by_opcode.get(&opcode).copied()
    }

    /// Returns the opcode bound to `op`.
    pub fn opcode_of(&self, op: Operation) -> Option<u8> {
        self.by_operation.get(&op).copied()
    }

    /// Returns `true` if `opcode` has a binding.
    pub fn contains_opcode(&self, opcode: u8) -> bool {
        self.by_opcode.contains_key(&opcode)
    }

    /// Number of bound opcodes.
    pub fn len(&self) -> usize {
        self.by_opcode.len()
    }

    /// Returns `true` if nothing is bound yet.
    pub fn is_empty(&self) -> bool {
        self.by_opcode.is_empty()
    }

    /// Returns `true` when every catalog operation has an opcode.
    pub fn is_complete(&self) -> bool {
        self.len() == Operation::ALL.len()
    }

    /// Iterates bindings in opcode order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Operation)> + '_ {
        self.by_opcode.iter().map(|(opcode, op)| (*opcode, *op))
    }
}

impl fmt::Display for BindingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (opcode, op) in self.iter() {
            writeln!(f, "{:>3} => {}", opcode, op)?;
        }
        Ok(())
    }
}

/// Candidate state of one solve call.
struct Solver {
    /// Candidates of opcodes seen but not yet bound.
    candidates: BTreeMap<u8, OperationSet>,
    /// Operations already bound to some opcode.
    assigned: OperationSet,
    table: BindingTable,
}

impl Solver {
    fn new() -> Self {
        Self {
            candidates: BTreeMap::new(),
            assigned: OperationSet::empty(),
            table: BindingTable::new(),
        }
    }

    fn observe(&mut self, index: usize, sample: &Sample) -> Result<(), VMError> {
        let opcode = sample.opcode();
        if self.table.contains_opcode(opcode) {
            return Ok(());
        }

        let unassigned = OperationSet::all().difference(self.assigned);
        let matching = sample.consistent_among(unassigned);
        let narrowed = match self.candidates.get(&opcode) {
            Some(current) => current.intersection(matching),
            None => matching,
        };
        self.candidates.insert(opcode, narrowed);

        self.settle(opcode, index)
    }

    /// Binds `opcode` if its candidates are down to one, then propagates.
    fn settle(&mut self, opcode: u8, sample: usize) -> Result<(), VMError> {
        let mut pending = vec![opcode];

        while let Some(opcode) = pending.pop() {
            let Some(&set) = self.candidates.get(&opcode) else {
                continue;
            };
            if set.is_empty() {
                return Err(VMError::NoConsistentOperation { opcode, sample });
            }
            let Some(op) = set.single() else {
                continue;
            };

            self.candidates.remove(&opcode);
            self.assigned.insert(op);
            self.table.insert(opcode, op)?;

            for (&other, others) in self.candidates.iter_mut() {
                if others.remove(op) && others.len() <= 1 {
                    pending.push(other);
                }
            }
        }

        Ok(())
    }

    fn finish(self) -> Result<BindingTable, VMError> {
        match self.candidates.iter().next() {
            Some((&opcode, set)) => Err(VMError::AmbiguousBinding {
                opcode,
                candidates: set.len(),
            }),
            None => Ok(self.table),
        }
    }
}

/// Deduces the opcode bindings implied by `samples`.
///
/// Every opcode that appears in the samples ends up bound to a distinct
/// operation, or the call fails:
/// - [`VMError::NoConsistentOperation`] when the evidence for an opcode rules
///   out every remaining operation,
/// - [`VMError::AmbiguousBinding`] when an opcode still has several candidates
///   after all samples are used (the lowest such opcode is reported).
pub fn solve_bindings(samples: &[Sample]) -> Result<BindingTable, VMError> {
    let mut solver = Solver::new();

    for (index, sample) in samples.iter().enumerate() {
        if let Err(e) = solver.observe(index, sample) {
            warn!("opcode solving failed: {e}");
            return Err(e);
        }
    }

    let table = solver.finish().inspect_err(|e| warn!("opcode solving failed: {e}"))?;
    info!(
        "bound {} opcodes from {} samples",
        table.len(),
        samples.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::utils::{sample, scrambled_bindings, synthesize_samples};

    #[test]
    fn empty_evidence_gives_empty_table() {
        assert_eq!(solve_bindings(&[]), Ok(BindingTable::new()));
    }

    #[test]
    fn single_unambiguous_sample() {
        let samples = [sample([3, 3, 5, 1], [7, 2, 1, 2], [3, 3, 8, 1])];
        let table = solve_bindings(&samples).unwrap();
        assert_eq!(table.get(7), Some(Operation::Addr));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn three_samples_for_one_opcode_narrow_to_common_operation() {
        // Matches addi, mulr and seti.
        let first = sample([3, 2, 1, 1], [9, 2, 1, 2], [3, 2, 2, 1]);
        // mulr only: 3 * 3 = 9.
        let second = sample([0, 3, 3, 0], [9, 1, 2, 3], [0, 3, 3, 9]);
        // mulr only: 5 * 4 = 20.
        let third = sample([5, 4, 0, 0], [9, 0, 1, 2], [5, 4, 20, 0]);

        assert_eq!(first.consistent_operations().len(), 3);
        assert_eq!(second.consistent_operations().len(), 1);
        assert_eq!(third.consistent_operations().len(), 1);

        let table = solve_bindings(&[first, second, third]).unwrap();
        assert_eq!(table.get(9), Some(Operation::Mulr));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn binding_propagates_to_other_opcodes() {
        // Opcode 1 could be addi, mulr or seti.
        let ambiguous = sample([3, 2, 1, 1], [1, 2, 1, 2], [3, 2, 2, 1]);
        // Opcode 2 is mulr.
        let mulr = sample([0, 3, 3, 0], [2, 1, 2, 3], [0, 3, 3, 9]);
        // Opcode 3 is seti: literal 13 lands in register 0.
        let seti = sample([0, 0, 0, 0], [3, 13, 0, 0], [13, 0, 0, 0]);

        let table = solve_bindings(&[ambiguous, mulr, seti]).unwrap();
        assert_eq!(table.get(1), Some(Operation::Addi));
        assert_eq!(table.get(2), Some(Operation::Mulr));
        assert_eq!(table.get(3), Some(Operation::Seti));
    }

    #[test]
    fn resolves_the_full_catalog() {
        let expected = scrambled_bindings();
        let samples = synthesize_samples(&expected);
        let table = solve_bindings(&samples).unwrap();
        assert!(table.is_complete());
        for (opcode, op) in expected.iter() {
            assert_eq!(table.get(opcode), Some(op));
        }
    }

    #[test]
    fn inconsistent_sample_is_reported() {
        let samples = [
            sample([0, 3, 3, 0], [2, 1, 2, 3], [0, 3, 3, 9]),
            sample([3, 2, 1, 1], [0, 2, 1, 2], [4, 2, 3, 1]),
        ];
        assert_eq!(
            solve_bindings(&samples),
            Err(VMError::NoConsistentOperation { opcode: 0, sample: 1 })
        );
    }

    #[test]
    fn contradicting_samples_for_one_opcode() {
        // First sample allows addi, mulr, seti; the second only addr and borr.
        let samples = [
            sample([3, 2, 1, 1], [5, 2, 1, 2], [3, 2, 2, 1]),
            sample([3, 2, 1, 1], [5, 2, 1, 2], [3, 2, 3, 1]),
        ];
        assert_eq!(
            solve_bindings(&samples),
            Err(VMError::NoConsistentOperation { opcode: 5, sample: 1 })
        );
    }

    #[test]
    fn insufficient_evidence_is_ambiguous() {
        let samples = [sample([3, 2, 1, 1], [9, 2, 1, 2], [3, 2, 2, 1])];
        assert_eq!(
            solve_bindings(&samples),
            Err(VMError::AmbiguousBinding {
                opcode: 9,
                candidates: 3
            })
        );
    }

    #[test]
    fn already_bound_operation_cannot_match_again() {
        // Opcode 0 is mulr; opcode 1 looks like mulr only, so nothing is left.
        let samples = [
            sample([0, 3, 3, 0], [0, 1, 2, 3], [0, 3, 3, 9]),
            sample([5, 4, 0, 0], [1, 0, 1, 2], [5, 4, 20, 0]),
        ];
        assert_eq!(
            solve_bindings(&samples),
            Err(VMError::NoConsistentOperation { opcode: 1, sample: 1 })
        );
    }

    #[test]
    fn later_samples_of_a_bound_opcode_are_not_rechecked() {
        let samples = [
            sample([0, 3, 3, 0], [4, 1, 2, 3], [0, 3, 3, 9]),
            // Impossible for mulr, but opcode 4 is already bound.
            sample([0, 0, 0, 0], [4, 0, 0, 0], [1, 1, 1, 1]),
        ];
        let table = solve_bindings(&samples).unwrap();
        assert_eq!(table.get(4), Some(Operation::Mulr));
    }

    // ==================== BindingTable ====================

    #[test]
    fn table_rejects_duplicate_operation() {
        let mut table = BindingTable::new();
        table.insert(0, Operation::Eqrr).unwrap();
        assert_eq!(
            table.insert(1, Operation::Eqrr),
            Err(VMError::DuplicateBinding {
                operation: "eqrr",
                opcode: 0
            })
        );
    }

    #[test]
    fn table_rejects_rebinding_opcode() {
        let mut table = BindingTable::new();
        table.insert(0, Operation::Eqrr).unwrap();
        assert_eq!(
            table.insert(0, Operation::Addr),
            Err(VMError::OpcodeAlreadyBound { opcode: 0 })
        );
    }

    #[test]
    fn table_lookups_both_ways() {
        let table =
            BindingTable::from_pairs(&[(3, Operation::Gtri), (11, Operation::Bani)]).unwrap();
        assert_eq!(table.get(11), Some(Operation::Bani));
        assert_eq!(table.opcode_of(Operation::Gtri), Some(3));
        assert_eq!(table.get(0), None);
        assert!(!table.is_complete());
    }

    #[test]
    fn table_display() {
        let table =
            BindingTable::from_pairs(&[(11, Operation::Bani), (3, Operation::Gtri)]).unwrap();
        assert_eq!(table.to_string(), "  3 => gtri\n 11 => bani\n");
    }
}
