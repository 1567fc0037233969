//! Basic classification example demonstrating core functionality.

use bbox_match::{
    calculate_iou, load_from_string, Aggregation, BoundingBox, EvalConfig, Evaluator,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Detection Classification Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let bbox1 = BoundingBox::new(1, 1, 1, 10, 10, 50, 50)?;
    let bbox2 = BoundingBox::new(2, 1, 1, 30, 30, 50, 50)?;
    let iou = calculate_iou(&bbox1, &bbox2)?;
    println!("   IoU between overlapping boxes: {:.4}", iou);
    println!();

    // Example 2: Load annotations
    println!("2. Loading Annotations");
    let ground_truth = load_from_string(
        r#"{
        "annotations": [
            {"annotation_id": 1, "image_id": 1, "category_id": 1, "x1": 100, "y1": 100, "w": 200, "h": 150},
            {"annotation_id": 2, "image_id": 1, "category_id": 2, "x1": 350, "y1": 200, "w": 100, "h": 120},
            {"annotation_id": 3, "image_id": 2, "category_id": 1, "x1": 40, "y1": 40, "w": 60, "h": 60}
        ]
    }"#,
    )?;
    let predictions = load_from_string(
        r#"{
        "annotations": [
            {"annotation_id": 1, "image_id": 1, "category_id": 1, "bbox": [105, 98, 200, 150]},
            {"annotation_id": 2, "image_id": 1, "category_id": 1, "bbox": [110, 110, 190, 140]},
            {"annotation_id": 3, "image_id": 1, "category_id": 2, "bbox": [500, 400, 60, 60]}
        ]
    }"#,
    )?;
    println!("   Loaded {} ground truth boxes", ground_truth.len());
    println!("   Loaded {} predicted boxes", predictions.len());
    println!();

    // Example 3: Classification
    println!("3. Classification (IoU >= 0.5)");
    let evaluator = Evaluator::new(ground_truth, predictions)?;
    let result = evaluator.evaluate(&EvalConfig::default())?.into_sorted();
    println!("   True positives:  {:?}", result.true_positives);
    println!("   False positives: {:?}", result.false_positives);
    println!("   False negatives: {:?}", result.false_negatives);
    println!("   {}", result.stats.summary_string());
    println!();

    // Example 4: Same evaluator, different settings
    println!("4. Stricter threshold, single worker, mutex aggregation");
    let config = EvalConfig::new()
        .with_iou_threshold(0.9)
        .with_workers(1)
        .with_aggregation(Aggregation::Mutex);
    let strict = evaluator.evaluate(&config)?.into_sorted();
    println!("   True positives:  {:?}", strict.true_positives);
    println!("   False positives: {:?}", strict.false_positives);
    println!("   False negatives: {:?}", strict.false_negatives);

    Ok(())
}
