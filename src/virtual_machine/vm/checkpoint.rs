use std::collections::HashSet;

/// Instruction index and register watched during instruction-pointer-bound execution.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Checkpoint {
    /// Instruction index at which the register is sampled.
    pub instruction: usize,
    /// Register whose value is recorded.
    pub register: usize,
}

impl Checkpoint {
    pub const fn new(instruction: usize, register: usize) -> Self {
        Self {
            instruction,
            register,
        }
    }
}

/// Values recorded at a checkpoint up to the first repeat.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CheckpointReport {
    /// First value recorded: the one that halts a looping program soonest.
    pub first_seen: u64,
    /// Most recent distinct value: the one that halts it latest.
    pub last_distinct: u64,
    /// Smallest distinct value recorded.
    pub lowest: u64,
    /// Largest distinct value recorded.
    pub highest: u64,
    /// Number of distinct values recorded.
    pub distinct: usize,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) enum Observation {
    New,
    Repeat,
}

/// Seen-set of checkpoint values for one run.
#[derive(Clone, Debug)]
pub(super) struct CheckpointMonitor {
    checkpoint: Checkpoint,
    seen: HashSet<u64>,
    report: Option<CheckpointReport>,
}

impl CheckpointMonitor {
    pub(super) fn new(checkpoint: Checkpoint) -> Self {
        Self {
            checkpoint,
            seen: HashSet::new(),
            report: None,
        }
    }

    pub(super) fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }

    /// Records `value`, reporting whether it was seen before.
    pub(super) fn observe(&mut self, value: u64) -> Observation {
        if !self.seen.insert(value) {
            return Observation::Repeat;
        }

        match &mut self.report {
            None => {
                self.report = Some(CheckpointReport {
                    first_seen: value,
                    last_distinct: value,
                    lowest: value,
                    highest: value,
                    distinct: 1,
                });
            }
            Some(report) => {
                report.last_distinct = value;
                report.lowest = report.lowest.min(value);
                report.highest = report.highest.max(value);
                report.distinct += 1;
            }
        }
        Observation::New
    }

    pub(super) fn report(&self) -> Option<CheckpointReport> {
        self.report
    }
}
