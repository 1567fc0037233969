//! The evaluation engine: a validated box store plus the two-pass classification.

use crate::aggregator::ResultAggregator;
use crate::config::EvalConfig;
use crate::error::Result;
use crate::loader::load_from_file;
use crate::matching::Pass;
use crate::scheduler::{run_pass, PassJob, WorkerPool};
use crate::stats::RunStats;
use crate::store::BoxStore;
use crate::types::{BoundingBox, EvaluationResult};
use log::{debug, info};
use std::path::Path;

/// Classifies predictions against ground truth.
///
/// The box store is built once in [`Evaluator::new`] and never changes, so an
/// `Evaluator` can be reused across calls and shared between threads.
/// Every [`Evaluator::evaluate`] call spawns its own worker pool and joins it
/// before returning; no other state outlives a call.
///
/// # Example
///
/// ```
/// use bbox_match::{BoundingBox, EvalConfig, Evaluator};
///
/// let gt = vec![BoundingBox::new(1, 1, 1, 0, 0, 10, 10).unwrap()];
/// let preds = vec![
///     BoundingBox::new(1, 1, 1, 0, 0, 10, 10).unwrap(),
///     BoundingBox::new(2, 1, 1, 50, 50, 10, 10).unwrap(),
/// ];
///
/// let evaluator = Evaluator::new(gt, preds).unwrap();
/// let result = evaluator.evaluate(&EvalConfig::default()).unwrap();
/// assert_eq!(result.true_positives, vec![1]);
/// assert_eq!(result.false_positives, vec![2]);
/// assert!(result.false_negatives.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    store: BoxStore,
}

impl Evaluator {
    /// Validate both collections and index them.
    pub fn new(ground_truth: Vec<BoundingBox>, predictions: Vec<BoundingBox>) -> Result<Self> {
        Ok(Self {
            store: BoxStore::new(ground_truth, predictions)?,
        })
    }

    /// Load both collections from annotation files.
    ///
    /// # Errors
    ///
    /// Fails with `EvalError::InputNotFound` if either file is missing, before
    /// anything is parsed.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(ground_truth_json: P, predictions_json: Q) -> Result<Self> {
        let ground_truth = load_from_file(ground_truth_json)?;
        let predictions = load_from_file(predictions_json)?;
        Self::new(ground_truth, predictions)
    }

    pub fn store(&self) -> &BoxStore {
        &self.store
    }

    /// Classify every prediction as TP or FP and report unmatched ground truths as FN.
    ///
    /// A prediction is TP if it reaches `iou_threshold` with at least one ground
    /// truth of the same image and category. A ground truth is FN if no
    /// prediction of the same image and category reaches it. Matching is not
    /// one-to-one: one ground truth may make several predictions TP.
    ///
    /// The returned id sets do not depend on the worker count or the
    /// aggregation strategy; only their order may vary.
    ///
    /// # Errors
    ///
    /// Returns a configuration error before any worker starts, or the first
    /// classification error a worker hits. No partial result is ever returned.
    pub fn evaluate(&self, config: &EvalConfig) -> Result<EvaluationResult> {
        config.validate()?;

        let pool = WorkerPool::new(config.resolved_workers())?;
        debug!(
            "evaluating at IoU {} with {} workers",
            config.iou_threshold,
            pool.workers()
        );

        let predictions = run_pass(
            &pool,
            PassJob {
                pass: Pass::Predictions,
                boxes: self.store.predictions(),
                opposite: self.store.ground_truth_index(),
                iou_threshold: config.iou_threshold,
            },
            config.aggregation,
        )?;

        let ground_truth = run_pass(
            &pool,
            PassJob {
                pass: Pass::GroundTruth,
                boxes: self.store.ground_truth(),
                opposite: self.store.prediction_index(),
                iou_threshold: config.iou_threshold,
            },
            config.aggregation,
        )?;

        let mut aggregator = ResultAggregator::new();
        aggregator.absorb(&predictions.outcomes);
        aggregator.absorb(&ground_truth.outcomes);
        debug_assert_eq!(
            aggregator.absorbed(),
            self.store.predictions().len() + self.store.ground_truth().len()
        );

        let stats = RunStats {
            predictions: self.store.predictions().len(),
            ground_truths: self.store.ground_truth().len(),
            ground_truth_groups: self.store.ground_truth_index().len(),
            prediction_groups: self.store.prediction_index().len(),
            workers: pool.workers(),
            prediction_chunks: predictions.chunks,
            ground_truth_chunks: ground_truth.chunks,
            ..RunStats::default()
        };

        let result = aggregator.finish(stats);
        info!("{}", result.stats.summary_string());
        Ok(result)
    }

    /// Evaluate with an explicit threshold and worker count.
    pub fn evaluate_with(&self, iou_threshold: f64, workers: usize) -> Result<EvaluationResult> {
        self.evaluate(
            &EvalConfig::new()
                .with_iou_threshold(iou_threshold)
                .with_workers(workers),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Aggregation;
    use crate::error::EvalError;

    fn bbox(id: u64, x: i64, y: i64) -> BoundingBox {
        BoundingBox::new(id, 1, 1, x, y, 10, 10).unwrap()
    }

    #[test]
    fn test_evaluate_basic() {
        let evaluator = Evaluator::new(vec![bbox(1, 0, 0), bbox(2, 100, 100)], vec![bbox(7, 1, 1)]).unwrap();
        let result = evaluator.evaluate(&EvalConfig::default()).unwrap();

        assert_eq!(result.true_positives, vec![7]);
        assert!(result.false_positives.is_empty());
        assert_eq!(result.false_negatives, vec![2]);
        assert_eq!(result.stats.predictions, 1);
        assert_eq!(result.stats.ground_truths, 2);
        assert_eq!(result.stats.matched_ground_truths(), 1);
        assert!(result.stats.is_total());
    }

    #[test]
    fn test_reusable_across_calls() {
        let evaluator = Evaluator::new(vec![bbox(1, 0, 0)], vec![bbox(1, 3, 0)]).unwrap();

        // IoU = 70 / 130
        let loose = evaluator.evaluate_with(0.5, 2).unwrap();
        let strict = evaluator.evaluate_with(0.9, 2).unwrap();
        assert_eq!(loose.true_positives, vec![1]);
        assert_eq!(strict.false_positives, vec![1]);
        assert_eq!(strict.false_negatives, vec![1]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let evaluator = Evaluator::new(vec![], vec![]).unwrap();
        assert!(matches!(
            evaluator.evaluate_with(0.0, 1),
            Err(EvalError::InvalidThreshold(_))
        ));
        assert!(matches!(
            evaluator.evaluate_with(0.5, 0),
            Err(EvalError::InvalidWorkerCount(0))
        ));
    }

    #[test]
    fn test_degenerate_box_rejected_before_evaluation() {
        let degenerate = BoundingBox::new_unchecked(3, 1, 1, 0, 0, 10, 0);
        let err = Evaluator::new(vec![bbox(1, 0, 0)], vec![bbox(1, 0, 0), degenerate]).unwrap_err();
        assert!(matches!(err, EvalError::MalformedRecord(_)));
    }

    #[test]
    fn test_large_boxes_evaluate_without_overflow() {
        let big = |id, h| BoundingBox::new(id, 1, 1, 0, 0, 3_000_000_000, h).unwrap();
        let evaluator =
            Evaluator::new(vec![big(1, 3_000_000_000)], vec![big(1, 3_000_000_000), big(2, 1_000_000_000)]).unwrap();

        for aggregation in [Aggregation::PerWorkerBuffers, Aggregation::Mutex, Aggregation::RwLock] {
            let config = EvalConfig::new().with_workers(2).with_aggregation(aggregation);
            let result = evaluator.evaluate(&config).unwrap().into_sorted();
            assert_eq!(result.true_positives, vec![1]);
            assert_eq!(result.false_positives, vec![2]);
            assert!(result.false_negatives.is_empty());
        }
    }

    #[test]
    fn test_missing_input_files() {
        let err = Evaluator::from_files("/no/such/gt.json", "/no/such/pred.json").unwrap_err();
        assert!(matches!(err, EvalError::InputNotFound(_)));
    }
}
