//! Statistics for a single evaluation run
//!
//! Input sizes, the shape of the work split and the outcome counts. Filled
//! by the evaluator and attached to every `EvaluationResult`.

use serde::{Deserialize, Serialize};

/// Bookkeeping collected while evaluating one box store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Number of predicted boxes classified
    pub predictions: usize,

    /// Number of ground truth boxes classified
    pub ground_truths: usize,

    /// Distinct `(image_id, category_id)` keys in the ground truth index
    pub ground_truth_groups: usize,

    /// Distinct `(image_id, category_id)` keys in the prediction index
    pub prediction_groups: usize,

    /// Worker threads in the pool
    pub workers: usize,

    /// Chunks dispatched for the prediction pass
    pub prediction_chunks: usize,

    /// Chunks dispatched for the ground truth pass
    pub ground_truth_chunks: usize,

    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl RunStats {
    /// Create a new `RunStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Ground truths satisfied by at least one prediction
    pub fn matched_ground_truths(&self) -> usize {
        self.ground_truths.saturating_sub(self.false_negatives)
    }

    /// Every prediction landed in exactly one of TP and FP
    pub fn is_total(&self) -> bool {
        self.true_positives + self.false_positives == self.predictions
            && self.false_negatives <= self.ground_truths
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "RunStats {{ predictions: {}, ground_truths: {}, tp: {}, fp: {}, fn: {}, workers: {}, chunks: {}/{} }}",
            self.predictions,
            self.ground_truths,
            self.true_positives,
            self.false_positives,
            self.false_negatives,
            self.workers,
            self.prediction_chunks,
            self.ground_truth_chunks
        )
    }
}
