//! Ambiguity diagnostics over raw samples.
//!
//! These queries look at each sample on its own and never narrow across
//! samples, so they can run before, after or instead of solving.

use crate::virtual_machine::sample::Sample;

/// Default candidate count at which a sample counts as ambiguous.
pub const DEFAULT_AMBIGUITY_THRESHOLD: usize = 3;

/// Returns, in sample order, how many catalog operations fit each sample.
pub fn candidate_counts(samples: &[Sample]) -> Vec<usize> {
    samples
        .iter()
        .map(|sample| sample.consistent_operations().len())
        .collect()
}

/// Counts samples consistent with at least `threshold` operations.
pub fn count_ambiguous(samples: &[Sample], threshold: usize) -> usize {
    samples
        .iter()
        .filter(|sample| sample.consistent_operations().len() >= threshold)
        .count()
}
