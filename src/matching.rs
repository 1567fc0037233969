//! First-qualifying-match classification of boxes against their candidate group.
//!
//! Matching is non-exclusive: a ground truth box can satisfy any number of
//! predictions and is never consumed. Classifying one box therefore never
//! changes the outcome for another, which is what lets the scheduler split the
//! work across workers in any way it likes.

use crate::error::Result;
use crate::iou::calculate_iou;
use crate::store::GroupIndex;
use crate::types::{BoundingBox, Classification, Label};

/// Check whether `bbox` overlaps any candidate at or above `iou_threshold`.
///
/// Candidates are scanned in index order and the scan stops at the first
/// qualifying one. The candidates are expected to share the box's
/// `(image_id, category_id)`; see [`GroupIndex::candidates`].
///
/// # Errors
///
/// Returns `EvalError::DegenerateBox` if a scanned pair contains a box with
/// non-positive width or height.
pub fn matches(bbox: &BoundingBox, candidates: &[BoundingBox], iou_threshold: f64) -> Result<bool> {
    for candidate in candidates {
        if calculate_iou(bbox, candidate)? >= iou_threshold {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Label a prediction TP or FP against the ground truth index.
pub fn classify_prediction(
    prediction: &BoundingBox,
    ground_truth_index: &GroupIndex,
    iou_threshold: f64,
) -> Result<Classification> {
    let candidates = ground_truth_index.candidates(prediction);
    let label = if matches(prediction, candidates, iou_threshold)? {
        Label::TruePositive
    } else {
        Label::FalsePositive
    };

    Ok(Classification {
        annotation_id: prediction.annotation_id(),
        label,
    })
}

/// Label a ground truth box matched or FN against the prediction index.
pub fn classify_ground_truth(
    ground_truth: &BoundingBox,
    prediction_index: &GroupIndex,
    iou_threshold: f64,
) -> Result<Classification> {
    let candidates = prediction_index.candidates(ground_truth);
    let label = if matches(ground_truth, candidates, iou_threshold)? {
        Label::Matched
    } else {
        Label::FalseNegative
    };

    Ok(Classification {
        annotation_id: ground_truth.annotation_id(),
        label,
    })
}

/// Which collection a pass classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Predictions against the ground truth index
    Predictions,
    /// Ground truths against the prediction index
    GroundTruth,
}

impl Pass {
    /// Classify one box of this pass against the opposite index.
    pub fn classify(
        self,
        bbox: &BoundingBox,
        opposite: &GroupIndex,
        iou_threshold: f64,
    ) -> Result<Classification> {
        match self {
            Pass::Predictions => classify_prediction(bbox, opposite, iou_threshold),
            Pass::GroundTruth => classify_ground_truth(bbox, opposite, iou_threshold),
        }
    }
}
