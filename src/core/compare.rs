//! Real-vs-ideal lockstep comparator.
//!
//! Two lines are equal for the pass/fail decision iff their file line
//! number and path match; bound-name and comment differences never fail a
//! check (they are preserved only for rendering the replacement). The scan
//! stops at the first mismatch: one divergence per pass, and a fixed file
//! re-checks as identical.

use crate::core::lines::ImportBlock;

/// Result of comparing the real block against the ideal block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    /// Every compared pair matched and the lengths agree.
    Identical,
    /// First index at which content differs, or at which one sequence ends
    /// before the other.
    Diverged { index: usize },
}

/// Walk both sequences in lockstep and locate the earliest mismatch.
pub fn compare(real: &ImportBlock, ideal: &ImportBlock) -> Divergence {
    let shorter = real.len().min(ideal.len());

    for i in 0..shorter {
        let r = &real.lines[i];
        let d = &ideal.lines[i];
        if r.line != d.line || r.path != d.path {
            return Divergence::Diverged { index: i };
        }
    }

    if real.len() != ideal.len() {
        // Equal prefix; the longer side's first extra line diverges.
        return Divergence::Diverged { index: shorter };
    }

    Divergence::Identical
}
