//! End-to-end classification scenarios.

use bbox_match::config::{Aggregation, EvalConfig};
use bbox_match::evaluator::Evaluator;
use bbox_match::loader::load_from_string;
use bbox_match::types::{BoundingBox, EvaluationResult};

fn create_box(id: u64, image_id: u64, category_id: u64, bbox: [i64; 4]) -> BoundingBox {
    BoundingBox::new(id, image_id, category_id, bbox[0], bbox[1], bbox[2], bbox[3]).unwrap()
}

fn run(ground_truth: Vec<BoundingBox>, predictions: Vec<BoundingBox>) -> EvaluationResult {
    Evaluator::new(ground_truth, predictions)
        .unwrap()
        .evaluate(&EvalConfig::default())
        .unwrap()
        .into_sorted()
}

#[test]
fn test_identical_boxes_are_true_positive() {
    let result = run(
        vec![create_box(1, 1, 1, [0, 0, 10, 10])],
        vec![create_box(1, 1, 1, [0, 0, 10, 10])],
    );

    assert_eq!(result.true_positives, vec![1]);
    assert!(result.false_positives.is_empty());
    assert!(result.false_negatives.is_empty());
}

#[test]
fn test_no_ground_truth_gives_false_positive() {
    let result = run(vec![], vec![create_box(1, 1, 1, [0, 0, 10, 10])]);

    assert!(result.true_positives.is_empty());
    assert_eq!(result.false_positives, vec![1]);
    assert!(result.false_negatives.is_empty());
}

#[test]
fn test_no_predictions_gives_false_negative() {
    let result = run(vec![create_box(1, 1, 1, [0, 0, 10, 10])], vec![]);

    assert!(result.true_positives.is_empty());
    assert!(result.false_positives.is_empty());
    assert_eq!(result.false_negatives, vec![1]);
}

#[test]
fn test_low_overlap_gives_false_positive_and_false_negative() {
    let result = run(
        vec![create_box(11, 1, 1, [0, 0, 10, 10])],
        vec![create_box(22, 1, 1, [6, 6, 10, 10])],
    );

    assert!(result.true_positives.is_empty());
    assert_eq!(result.false_positives, vec![22]);
    assert_eq!(result.false_negatives, vec![11]);
}

#[test]
fn test_one_ground_truth_satisfies_many_predictions() {
    let result = run(
        vec![create_box(1, 1, 1, [0, 0, 10, 10])],
        vec![
            create_box(1, 1, 1, [0, 0, 10, 10]),
            create_box(2, 1, 1, [1, 1, 10, 10]),
        ],
    );

    assert_eq!(result.true_positives, vec![1, 2]);
    assert!(result.false_positives.is_empty());
    assert!(result.false_negatives.is_empty());
}

#[test]
fn test_empty_inputs() {
    let result = run(vec![], vec![]);

    assert!(result.true_positives.is_empty());
    assert!(result.false_positives.is_empty());
    assert!(result.false_negatives.is_empty());
    assert_eq!(result.stats.prediction_chunks, 0);
}

#[test]
fn test_image_and_category_isolation() {
    // Same geometry, but each prediction lives in a different image or category
    let ground_truth = vec![
        create_box(1, 1, 1, [10, 10, 50, 50]),
        create_box(2, 1, 2, [100, 100, 50, 50]),
    ];
    let predictions = vec![
        create_box(1, 1, 1, [10, 10, 50, 50]),
        create_box(2, 2, 1, [10, 10, 50, 50]),
        create_box(3, 1, 3, [100, 100, 50, 50]),
    ];

    let result = run(ground_truth, predictions);
    assert_eq!(result.true_positives, vec![1]);
    assert_eq!(result.false_positives, vec![2, 3]);
    assert_eq!(result.false_negatives, vec![2]);
}

#[test]
fn test_ids_shared_across_collections_are_independent() {
    // Prediction 5 matches ground truth 9; ground truth 5 is unrelated and missed
    let result = run(
        vec![create_box(9, 1, 1, [0, 0, 20, 20]), create_box(5, 1, 1, [200, 200, 20, 20])],
        vec![create_box(5, 1, 1, [1, 1, 20, 20])],
    );

    assert_eq!(result.true_positives, vec![5]);
    assert_eq!(result.false_negatives, vec![5]);
}

#[test]
fn test_all_strategies_and_worker_counts_agree() {
    let mut ground_truth = Vec::new();
    let mut predictions = Vec::new();
    for i in 0..60u64 {
        let image_id = i % 4;
        let x = (i as i64 % 10) * 30;
        let y = (i as i64 / 10) * 30;
        ground_truth.push(create_box(i, image_id, 1, [x, y, 20, 20]));
        // Every third prediction is shifted far enough to miss
        let shift = if i % 3 == 0 { 15 } else { 2 };
        predictions.push(create_box(1000 + i, image_id, 1, [x + shift, y, 20, 20]));
    }

    let evaluator = Evaluator::new(ground_truth, predictions).unwrap();
    let reference = evaluator
        .evaluate(&EvalConfig::new().with_workers(1))
        .unwrap()
        .into_sorted();
    assert_eq!(reference.true_positives.len(), 40);
    assert_eq!(reference.false_positives.len(), 20);
    assert_eq!(reference.false_negatives.len(), 20);

    for workers in [2, 3, 8, 64] {
        for aggregation in [Aggregation::PerWorkerBuffers, Aggregation::Mutex, Aggregation::RwLock] {
            let config = EvalConfig::new()
                .with_workers(workers)
                .with_aggregation(aggregation);
            let result = evaluator.evaluate(&config).unwrap().into_sorted();

            assert_eq!(result.true_positives, reference.true_positives);
            assert_eq!(result.false_positives, reference.false_positives);
            assert_eq!(result.false_negatives, reference.false_negatives);
            assert_eq!(result.stats.workers, workers);
        }
    }
}

#[test]
fn test_evaluate_from_loaded_json() {
    let ground_truth = load_from_string(
        r#"{
            "annotations": [
                {"annotation_id": 1, "image_id": 1, "category_id": 1, "x1": 0, "y1": 0, "w": 10, "h": 10},
                {"annotation_id": 2, "image_id": 1, "category_id": 1, "x1": 100, "y1": 100, "w": 10, "h": 10}
            ]
        }"#,
    )
    .unwrap();
    let predictions = load_from_string(
        r#"{
            "annotations": [
                {"annotation_id": 1, "image_id": 1, "category_id": 1, "bbox": [1, 0, 10, 10]},
                {"annotation_id": 2, "image_id": 1, "category_id": 1, "bbox": [300, 300, 10, 10]}
            ]
        }"#,
    )
    .unwrap();

    let (tp, fp, fn_) = run(ground_truth, predictions).into_tuple();
    assert_eq!(tp, vec![1]);
    assert_eq!(fp, vec![2]);
    assert_eq!(fn_, vec![2]);
}

#[test]
fn test_result_serializes() {
    let result = run(
        vec![create_box(1, 1, 1, [0, 0, 10, 10])],
        vec![create_box(1, 1, 1, [0, 0, 10, 10])],
    );

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["true_positives"], serde_json::json!([1]));
    assert_eq!(json["stats"]["predictions"], serde_json::json!(1));
}
