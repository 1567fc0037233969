//! # bbox-match
//!
//! A Rust library that classifies predicted object detections against ground
//! truth using an Intersection-over-Union (IoU) overlap test, in parallel.
//!
//! Every prediction is labelled:
//! - **TP** (true positive) if it overlaps at least one ground truth box of the
//!   same image and category with IoU at or above the threshold
//! - **FP** (false positive) otherwise
//!
//! Every ground truth box nobody overlaps that much is reported as **FN**
//! (false negative). Matching is not one-to-one: a single ground truth box can
//! make several predictions true positives.
//!
//! ## Features
//!
//! - Load annotation files with either `x1`/`y1`/`w`/`h` fields or a `bbox` array
//! - Group boxes by `(image_id, category_id)` once, then share the index read-only
//! - Fork-join evaluation over contiguous ranges on a bounded worker pool
//! - Identical id sets for any worker count and aggregation strategy
//! - Fail-fast errors: the first error wins and no partial result escapes
//!
//! ## Quick Start
//!
//! ```rust
//! use bbox_match::{BoundingBox, EvalConfig, Evaluator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // In actual use: Evaluator::from_files("ground_truths.json", "predictions.json")?
//! let ground_truth = vec![BoundingBox::new(1, 1, 1, 0, 0, 10, 10)?];
//! let predictions = vec![BoundingBox::new(1, 1, 1, 6, 6, 10, 10)?];
//!
//! let evaluator = Evaluator::new(ground_truth, predictions)?;
//! let result = evaluator.evaluate(&EvalConfig::default())?.into_sorted();
//!
//! assert!(result.true_positives.is_empty());
//! assert_eq!(result.false_positives, vec![1]);
//! assert_eq!(result.false_negatives, vec![1]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Annotation Format
//!
//! ```json
//! {
//!   "annotations": [
//!     {"annotation_id": 1, "image_id": 1, "category_id": 1, "x1": 10, "y1": 20, "w": 30, "h": 40},
//!     {"annotation_id": 2, "image_id": 1, "category_id": 1, "bbox": [50, 60, 70, 80]}
//!   ]
//! }
//! ```

pub mod error;
pub mod types;
pub mod loader;
pub mod config;
pub mod iou;
pub mod store;
pub mod matching;
pub mod scheduler;
pub mod aggregator;
pub mod stats;
pub mod evaluator;

// Re-export commonly used types and functions
pub use error::{EvalError, Result};
pub use types::{BoundingBox, Classification, EvaluationResult, GroupKey, Label};
pub use config::{Aggregation, EvalConfig};
pub use evaluator::Evaluator;
pub use iou::calculate_iou;
pub use loader::{load_from_file, load_from_string};
pub use stats::RunStats;
