//! JSON loading and schema validation for annotation files.
//!
//! An annotation file looks like
//!
//! ```json
//! {
//!   "annotations": [
//!     {"annotation_id": 1, "image_id": 1, "category_id": 1, "x1": 10, "y1": 20, "w": 30, "h": 40},
//!     {"id": 2, "image_id": 1, "category_id": 1, "bbox": [50, 60, 70, 80]}
//!   ]
//! }
//! ```
//!
//! Geometry is given either as separate `x1`/`y1`/`w`/`h` fields or as a
//! 4-element `bbox` array `[x1, y1, w, h]`. Every record either becomes a
//! [`BoundingBox`] or fails with a typed error; no field is ever defaulted.

use crate::error::{EvalError, Result};
use crate::types::BoundingBox;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A record as it appears on disk, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(alias = "id")]
    pub annotation_id: Option<u64>,
    pub image_id: Option<u64>,
    pub category_id: Option<u64>,
    pub x1: Option<i64>,
    pub y1: Option<i64>,
    pub w: Option<i64>,
    pub h: Option<i64>,
    pub bbox: Option<Vec<i64>>,
}

impl RawRecord {
    /// Validate this record into a bounding box.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::MalformedRecord` if a required field is missing,
    /// geometry is given both ways or neither way, the `bbox` array does not
    /// have 4 values, or width/height is not positive.
    pub fn into_bbox(self) -> Result<BoundingBox> {
        let annotation_id = require(self.annotation_id, "annotation_id", None)?;
        let image_id = require(self.image_id, "image_id", Some(annotation_id))?;
        let category_id = require(self.category_id, "category_id", Some(annotation_id))?;

        let has_fields = self.x1.is_some() || self.y1.is_some() || self.w.is_some() || self.h.is_some();

        let (x1, y1, w, h) = match self.bbox {
            Some(_) if has_fields => {
                return Err(EvalError::MalformedRecord(format!(
                    "annotation {annotation_id} has both bbox and x1/y1/w/h geometry"
                )));
            }
            Some(bbox) => match bbox.as_slice() {
                &[x1, y1, w, h] => (x1, y1, w, h),
                _ => {
                    return Err(EvalError::MalformedRecord(format!(
                        "annotation {annotation_id} has invalid bbox length: {}",
                        bbox.len()
                    )));
                }
            },
            None => (
                require(self.x1, "x1", Some(annotation_id))?,
                require(self.y1, "y1", Some(annotation_id))?,
                require(self.w, "w", Some(annotation_id))?,
                require(self.h, "h", Some(annotation_id))?,
            ),
        };

        BoundingBox::new(annotation_id, image_id, category_id, x1, y1, w, h)
    }
}

impl TryFrom<RawRecord> for BoundingBox {
    type Error = EvalError;

    fn try_from(record: RawRecord) -> Result<Self> {
        record.into_bbox()
    }
}

fn require<T>(value: Option<T>, field: &str, annotation_id: Option<u64>) -> Result<T> {
    value.ok_or_else(|| match annotation_id {
        Some(id) => EvalError::MalformedRecord(format!("annotation {id} is missing field `{field}`")),
        None => EvalError::MalformedRecord(format!("record is missing field `{field}`")),
    })
}

/// Top-level shape of an annotation file.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationFile {
    pub annotations: Vec<RawRecord>,
}

/// Validate raw records into boxes, stopping at the first bad record.
pub fn parse_records(records: Vec<RawRecord>) -> Result<Vec<BoundingBox>> {
    records.into_iter().map(RawRecord::into_bbox).collect()
}

/// Load boxes from an annotation JSON file.
///
/// # Errors
///
/// Returns `EvalError::InputNotFound` if the file does not exist,
/// `EvalError::JsonError` for unparseable JSON and
/// `EvalError::MalformedRecord` for schema violations.
///
/// # Example
///
/// ```no_run
/// use bbox_match::loader::load_from_file;
///
/// let boxes = load_from_file("ground_truths.json").unwrap();
/// println!("Loaded {} boxes", boxes.len());
/// ```
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<BoundingBox>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EvalError::InputNotFound(path.to_path_buf()));
    }

    let reader = BufReader::new(File::open(path)?);
    let file: AnnotationFile = serde_json::from_reader(reader)?;
    parse_records(file.annotations)
}

/// Load boxes from an annotation JSON string.
///
/// # Example
///
/// ```
/// use bbox_match::loader::load_from_string;
///
/// let json = r#"{
///     "annotations": [
///         {"annotation_id": 1, "image_id": 1, "category_id": 1, "bbox": [0, 0, 10, 10]}
///     ]
/// }"#;
/// let boxes = load_from_string(json).unwrap();
/// assert_eq!(boxes[0].x2(), 10);
/// ```
pub fn load_from_string(json_str: &str) -> Result<Vec<BoundingBox>> {
    let file: AnnotationFile = serde_json::from_str(json_str)?;
    parse_records(file.annotations)
}
