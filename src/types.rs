//! Core data types for boxes and classification results.

use crate::error::{EvalError, Result};
use crate::stats::RunStats;
use serde::{Deserialize, Serialize};

/// Key under which boxes are grouped: `(image_id, category_id)`.
pub type GroupKey = (u64, u64);

/// An axis-aligned bounding box with its annotation identity.
///
/// Geometry is in LTWH (Left-Top-Width-Height) integer pixels:
/// - x1: Left coordinate
/// - y1: Top coordinate
/// - w: Box width, strictly positive
/// - h: Box height, strictly positive
///
/// Boxes are immutable once constructed; fields are only readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "crate::loader::RawRecord")]
pub struct BoundingBox {
    annotation_id: u64,
    image_id: u64,
    category_id: u64,
    x1: i64,
    y1: i64,
    w: i64,
    h: i64,
}

impl BoundingBox {
    /// Create a new bounding box, rejecting non-positive width or height.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::MalformedRecord` if `w <= 0` or `h <= 0`, or if the
    /// right edge, bottom edge or area does not fit in an `i64`.
    ///
    /// # Example
    ///
    /// ```
    /// use bbox_match::types::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(1, 1, 1, 0, 0, 10, 10).unwrap();
    /// assert_eq!(bbox.x2(), 10);
    /// assert!(BoundingBox::new(2, 1, 1, 0, 0, 0, 10).is_err());
    /// ```
    pub fn new(
        annotation_id: u64,
        image_id: u64,
        category_id: u64,
        x1: i64,
        y1: i64,
        w: i64,
        h: i64,
    ) -> Result<Self> {
        if w <= 0 || h <= 0 {
            return Err(EvalError::MalformedRecord(format!(
                "annotation {annotation_id} has non-positive dimensions {w}x{h}"
            )));
        }
        if !geometry_in_range(x1, y1, w, h) {
            return Err(EvalError::MalformedRecord(format!(
                "annotation {annotation_id} geometry ({x1}, {y1}, {w}x{h}) overflows i64"
            )));
        }
        Ok(Self::new_unchecked(annotation_id, image_id, category_id, x1, y1, w, h))
    }

    /// Create a bounding box without validating its dimensions.
    ///
    /// Intended for callers that already validated their input. A box with
    /// non-positive width or height built this way makes the IoU computation
    /// fail with `EvalError::DegenerateBox`, and `BoxStore::new` refuses any
    /// box for which [`BoundingBox::is_valid`] is false.
    pub fn new_unchecked(
        annotation_id: u64,
        image_id: u64,
        category_id: u64,
        x1: i64,
        y1: i64,
        w: i64,
        h: i64,
    ) -> Self {
        Self {
            annotation_id,
            image_id,
            category_id,
            x1,
            y1,
            w,
            h,
        }
    }

    pub fn annotation_id(&self) -> u64 {
        self.annotation_id
    }

    pub fn image_id(&self) -> u64 {
        self.image_id
    }

    pub fn category_id(&self) -> u64 {
        self.category_id
    }

    /// The `(image_id, category_id)` group this box belongs to.
    pub fn group_key(&self) -> GroupKey {
        (self.image_id, self.category_id)
    }

    pub fn x1(&self) -> i64 {
        self.x1
    }

    pub fn y1(&self) -> i64 {
        self.y1
    }

    pub fn width(&self) -> i64 {
        self.w
    }

    pub fn height(&self) -> i64 {
        self.h
    }

    /// Get the right coordinate (x1 + w).
    ///
    /// Exact for boxes accepted by [`BoundingBox::new`]; saturates otherwise.
    pub fn x2(&self) -> i64 {
        self.x1.saturating_add(self.w)
    }

    /// Get the bottom coordinate (y1 + h).
    pub fn y2(&self) -> i64 {
        self.y1.saturating_add(self.h)
    }

    /// Get the area of the bounding box.
    pub fn area(&self) -> i64 {
        self.w.saturating_mul(self.h)
    }

    /// Check if the bounding box is valid: positive dimensions, and corners
    /// and area representable as `i64`.
    pub fn is_valid(&self) -> bool {
        self.w > 0 && self.h > 0 && geometry_in_range(self.x1, self.y1, self.w, self.h)
    }
}

fn geometry_in_range(x1: i64, y1: i64, w: i64, h: i64) -> bool {
    x1.checked_add(w).is_some() && y1.checked_add(h).is_some() && w.checked_mul(h).is_some()
}

/// Label assigned to a single box by the match engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Prediction overlapping some ground truth at or above the threshold.
    TruePositive,
    /// Prediction overlapping no ground truth at or above the threshold.
    FalsePositive,
    /// Ground truth satisfied by at least one prediction; not reported.
    Matched,
    /// Ground truth satisfied by no prediction.
    FalseNegative,
}

/// Outcome of classifying one box: its id and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub annotation_id: u64,
    pub label: Label,
}

/// The three disjoint id collections produced by an evaluation.
///
/// Order is not significant; use [`EvaluationResult::into_sorted`] for display.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationResult {
    /// Ids of predictions labelled TP
    pub true_positives: Vec<u64>,
    /// Ids of predictions labelled FP
    pub false_positives: Vec<u64>,
    /// Ids of ground truths no prediction satisfied
    pub false_negatives: Vec<u64>,
    /// Bookkeeping for the run that produced this result
    pub stats: RunStats,
}

impl EvaluationResult {
    /// Sort all three id collections ascending.
    pub fn into_sorted(mut self) -> Self {
        self.true_positives.sort_unstable();
        self.false_positives.sort_unstable();
        self.false_negatives.sort_unstable();
        self
    }

    /// Split into the plain `(TP, FP, FN)` triple.
    pub fn into_tuple(self) -> (Vec<u64>, Vec<u64>, Vec<u64>) {
        (self.true_positives, self.false_positives, self.false_negatives)
    }
}
