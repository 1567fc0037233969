//! Immutable box storage and the `(image_id, category_id)` group index.

use crate::error::{EvalError, Result};
use crate::types::{BoundingBox, GroupKey};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Read-only lookup from `(image_id, category_id)` to the boxes sharing that key.
///
/// Each group keeps the boxes in the order they appeared in the source
/// collection. The index is never mutated after [`GroupIndex::build`], so any
/// number of workers may read it concurrently.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: HashMap<GroupKey, Vec<BoundingBox>>,
}

impl GroupIndex {
    /// Group boxes by image_id and category_id.
    pub fn build(boxes: &[BoundingBox]) -> Self {
        let mut groups: HashMap<GroupKey, Vec<BoundingBox>> = HashMap::new();

        for bbox in boxes {
            groups.entry(bbox.group_key()).or_default().push(*bbox);
        }

        Self { groups }
    }

    /// Candidates for `bbox`: boxes with the same image and category.
    ///
    /// Returns an empty slice when no box shares the key.
    pub fn candidates(&self, bbox: &BoundingBox) -> &[BoundingBox] {
        self.group(bbox.group_key())
    }

    pub fn group(&self, key: GroupKey) -> &[BoundingBox] {
        self.groups.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct `(image_id, category_id)` keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Ground-truth and predicted boxes together with their group indexes.
///
/// Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct BoxStore {
    ground_truth: Vec<BoundingBox>,
    predictions: Vec<BoundingBox>,
    ground_truth_index: GroupIndex,
    prediction_index: GroupIndex,
}

impl BoxStore {
    /// Validate both collections and build their indexes.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::MalformedRecord` if a box fails
    /// [`BoundingBox::is_valid`] or an annotation id repeats within one
    /// collection. Ids may repeat across the two collections.
    pub fn new(ground_truth: Vec<BoundingBox>, predictions: Vec<BoundingBox>) -> Result<Self> {
        ensure_valid_boxes(&ground_truth, "ground truth")?;
        ensure_valid_boxes(&predictions, "predictions")?;
        ensure_unique_ids(&ground_truth, "ground truth")?;
        ensure_unique_ids(&predictions, "predictions")?;

        let ground_truth_index = GroupIndex::build(&ground_truth);
        let prediction_index = GroupIndex::build(&predictions);

        debug!(
            "indexed {} ground truth boxes into {} groups, {} predictions into {} groups",
            ground_truth.len(),
            ground_truth_index.len(),
            predictions.len(),
            prediction_index.len()
        );

        Ok(Self {
            ground_truth,
            predictions,
            ground_truth_index,
            prediction_index,
        })
    }

    pub fn ground_truth(&self) -> &[BoundingBox] {
        &self.ground_truth
    }

    pub fn predictions(&self) -> &[BoundingBox] {
        &self.predictions
    }

    /// Ground truth grouped by key; predictions are matched against this.
    pub fn ground_truth_index(&self) -> &GroupIndex {
        &self.ground_truth_index
    }

    /// Predictions grouped by key; ground truths are matched against this.
    pub fn prediction_index(&self) -> &GroupIndex {
        &self.prediction_index
    }
}

fn ensure_valid_boxes(boxes: &[BoundingBox], collection: &str) -> Result<()> {
    match boxes.iter().find(|bbox| !bbox.is_valid()) {
        Some(bbox) => Err(EvalError::MalformedRecord(format!(
            "annotation {} in {collection} has invalid geometry ({}, {}, {}x{})",
            bbox.annotation_id(),
            bbox.x1(),
            bbox.y1(),
            bbox.width(),
            bbox.height()
        ))),
        None => Ok(()),
    }
}

fn ensure_unique_ids(boxes: &[BoundingBox], collection: &str) -> Result<()> {
    let mut seen: HashSet<u64> = HashSet::with_capacity(boxes.len());

    for bbox in boxes {
        if !seen.insert(bbox.annotation_id()) {
            return Err(EvalError::MalformedRecord(format!(
                "duplicate annotation_id {} in {collection}",
                bbox.annotation_id()
            )));
        }
    }

    Ok(())
}
