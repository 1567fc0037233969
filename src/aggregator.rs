//! Gathering per-box outcomes into the final TP / FP / FN id collections.
//!
//! Two ways of getting outcomes out of the workers are supported. With
//! private buffers each chunk owns a `Vec` nobody else touches and the
//! buffers are concatenated after the join. With a [`SharedOutcomes`]
//! collection every append takes a lock, so appends never interleave.
//! Either way each classified box contributes exactly one outcome.

use crate::config::Aggregation;
use crate::stats::RunStats;
use crate::types::{Classification, EvaluationResult, Label};
use parking_lot::{Mutex, RwLock};

/// A single outcome collection shared by all workers of one pass.
#[derive(Debug)]
pub enum SharedOutcomes {
    Mutex(Mutex<Vec<Classification>>),
    /// Every access is a write, so this always takes the exclusive lock.
    RwLock(RwLock<Vec<Classification>>),
}

impl SharedOutcomes {
    /// Shared collection for a locking aggregation strategy.
    ///
    /// Returns `None` for `Aggregation::PerWorkerBuffers`, which shares nothing.
    pub fn for_aggregation(aggregation: Aggregation, capacity: usize) -> Option<Self> {
        match aggregation {
            Aggregation::PerWorkerBuffers => None,
            Aggregation::Mutex => Some(Self::Mutex(Mutex::new(Vec::with_capacity(capacity)))),
            Aggregation::RwLock => Some(Self::RwLock(RwLock::new(Vec::with_capacity(capacity)))),
        }
    }

    /// Append one outcome inside the critical section.
    pub fn push(&self, outcome: Classification) {
        match self {
            Self::Mutex(outcomes) => outcomes.lock().push(outcome),
            Self::RwLock(outcomes) => outcomes.write().push(outcome),
        }
    }

    pub fn into_inner(self) -> Vec<Classification> {
        match self {
            Self::Mutex(outcomes) => outcomes.into_inner(),
            Self::RwLock(outcomes) => outcomes.into_inner(),
        }
    }
}

/// Concatenate per-chunk buffers in chunk order.
pub fn concat_buffers(buffers: Vec<Vec<Classification>>) -> Vec<Classification> {
    let total = buffers.iter().map(Vec::len).sum();
    let mut outcomes = Vec::with_capacity(total);
    for buffer in buffers {
        outcomes.extend(buffer);
    }
    outcomes
}

/// Routes outcomes into the three result collections by label.
///
/// Matched ground truths are counted but not reported.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    true_positives: Vec<u64>,
    false_positives: Vec<u64>,
    false_negatives: Vec<u64>,
    matched: usize,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the outcomes of one pass.
    pub fn absorb(&mut self, outcomes: &[Classification]) {
        for outcome in outcomes {
            match outcome.label {
                Label::TruePositive => self.true_positives.push(outcome.annotation_id),
                Label::FalsePositive => self.false_positives.push(outcome.annotation_id),
                Label::FalseNegative => self.false_negatives.push(outcome.annotation_id),
                Label::Matched => self.matched += 1,
            }
        }
    }

    /// Number of outcomes absorbed so far, reported or not.
    pub fn absorbed(&self) -> usize {
        self.true_positives.len()
            + self.false_positives.len()
            + self.false_negatives.len()
            + self.matched
    }

    /// Produce the final result, filling the outcome counts of `stats`.
    pub fn finish(self, mut stats: RunStats) -> EvaluationResult {
        stats.true_positives = self.true_positives.len();
        stats.false_positives = self.false_positives.len();
        stats.false_negatives = self.false_negatives.len();

        EvaluationResult {
            true_positives: self.true_positives,
            false_positives: self.false_positives,
            false_negatives: self.false_negatives,
            stats,
        }
    }
}
