use crate::virtual_machine::isa::{OPERATION_COUNT, Operation};
use std::fmt;

/// Set of catalog operations, one bit per operation tag.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct OperationSet(u16);

impl OperationSet {
    /// Creates an empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates the set holding the whole catalog.
    pub const fn all() -> Self {
        Self(u16::MAX >> (16 - OPERATION_COUNT))
    }

    const fn bit(op: Operation) -> u16 {
        1 << op as u8
    }

    /// Adds `op`; returns `false` if it was already present.
    pub fn insert(&mut self, op: Operation) -> bool {
        let had = self.contains(op);
        self.0 |= Self::bit(op);
        !had
    }

    /// Removes `op`; returns `true` if it was present.
    pub fn remove(&mut self, op: Operation) -> bool {
        let had = self.contains(op);
        self.0 &= !Self::bit(op);
        had
    }

    /// Returns `true` if `op` is a member.
    pub const fn contains(&self, op: Operation) -> bool {
        self.0 & Self::bit(op) != 0
    }

    /// Number of operations in the set.
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if no operation is left.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the operations present in both sets.
    pub const fn intersection(self, other: OperationSet) -> OperationSet {
        Self(self.0 & other.0)
    }

    /// Returns the set without the members of `other`.
    pub const fn difference(self, other: OperationSet) -> OperationSet {
        Self(self.0 & !other.0)
    }

    /// Returns the only member, if the set holds exactly one operation.
    pub fn single(&self) -> Option<Operation> {
        if self.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    /// Iterates members in tag order.
    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(|op| self.contains(*op))
    }
}

impl FromIterator<Operation> for OperationSet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut set = OperationSet::empty();
        for op in iter {
            set.insert(op);
        }
        set
    }
}

impl fmt::Debug for OperationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_holds_every_operation() {
        let all = OperationSet::all();
        assert_eq!(all.len(), OPERATION_COUNT);
        assert!(Operation::ALL.iter().all(|op| all.contains(*op)));
    }

    #[test]
    fn insert_and_remove() {
        let mut set = OperationSet::empty();
        assert!(set.insert(Operation::Eqrr));
        assert!(!set.insert(Operation::Eqrr));
        assert!(set.contains(Operation::Eqrr));
        assert!(set.remove(Operation::Eqrr));
        assert!(!set.remove(Operation::Eqrr));
        assert!(set.is_empty());
    }

    #[test]
    fn single_only_for_one_member() {
        let mut set: OperationSet = [Operation::Addr, Operation::Seti].into_iter().collect();
        assert_eq!(set.single(), None);
        set.remove(Operation::Addr);
        assert_eq!(set.single(), Some(Operation::Seti));
        assert_eq!(OperationSet::empty().single(), None);
    }

    #[test]
    fn intersection_and_difference() {
        let a: OperationSet = [Operation::Addr, Operation::Mulr, Operation::Banr]
            .into_iter()
            .collect();
        let b: OperationSet = [Operation::Mulr, Operation::Banr, Operation::Gtri]
            .into_iter()
            .collect();
        assert_eq!(
            a.intersection(b).iter().collect::<Vec<_>>(),
            vec![Operation::Mulr, Operation::Banr]
        );
        assert_eq!(a.difference(b).single(), Some(Operation::Addr));
    }

    #[test]
    fn debug_lists_members_in_tag_order() {
        let set: OperationSet = [Operation::Eqrr, Operation::Addi].into_iter().collect();
        assert_eq!(format!("{:?}", set), "{Addi, Eqrr}");
    }
}
