//! Intersection over Union (IoU) calculation.

use crate::error::{EvalError, Result};
use crate::types::BoundingBox;

/// Calculate the Intersection over Union (IoU) between two bounding boxes.
///
/// IoU is defined as the area of intersection divided by the area of union.
/// Boxes sharing only an edge or a corner have zero intersection. Corners and
/// areas are computed in `i128`, so no pair of `i64` boxes can overflow.
///
/// # Arguments
///
/// * `bbox1` - First bounding box
/// * `bbox2` - Second bounding box
///
/// # Returns
///
/// Returns a value between 0.0 (no overlap) and 1.0 (perfect overlap).
///
/// # Errors
///
/// Returns `EvalError::DegenerateBox` if either box has non-positive width or
/// height, which would otherwise make the union empty.
///
/// # Example
///
/// ```
/// use bbox_match::iou::calculate_iou;
/// use bbox_match::types::BoundingBox;
///
/// let bbox1 = BoundingBox::new(1, 1, 1, 0, 0, 10, 10).unwrap();
/// let bbox2 = BoundingBox::new(2, 1, 1, 5, 5, 10, 10).unwrap();
/// let iou = calculate_iou(&bbox1, &bbox2).unwrap();
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(bbox1: &BoundingBox, bbox2: &BoundingBox) -> Result<f64> {
    ensure_non_degenerate(bbox1)?;
    ensure_non_degenerate(bbox2)?;

    let (ax1, ay1, ax2, ay2) = corners(bbox1);
    let (bx1, by1, bx2, by2) = corners(bbox2);

    let x_left = ax1.max(bx1);
    let y_top = ay1.max(by1);
    let x_right = ax2.min(bx2);
    let y_bottom = ay2.min(by2);

    let intersection_area = (x_right - x_left).max(0) * (y_bottom - y_top).max(0);
    let union_area = area(bbox1) + area(bbox2) - intersection_area;

    Ok(intersection_area as f64 / union_area as f64)
}

fn corners(bbox: &BoundingBox) -> (i128, i128, i128, i128) {
    let x1 = i128::from(bbox.x1());
    let y1 = i128::from(bbox.y1());
    (x1, y1, x1 + i128::from(bbox.width()), y1 + i128::from(bbox.height()))
}

fn area(bbox: &BoundingBox) -> i128 {
    i128::from(bbox.width()) * i128::from(bbox.height())
}

fn ensure_non_degenerate(bbox: &BoundingBox) -> Result<()> {
    if bbox.width() > 0 && bbox.height() > 0 {
        Ok(())
    } else {
        Err(EvalError::DegenerateBox {
            annotation_id: bbox.annotation_id(),
            width: bbox.width(),
            height: bbox.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: i64, y: i64, w: i64, h: i64) -> BoundingBox {
        BoundingBox::new(1, 1, 1, x, y, w, h).unwrap()
    }

    #[test]
    fn test_identical_boxes() {
        let iou = calculate_iou(&bbox(0, 0, 10, 10), &bbox(0, 0, 10, 10)).unwrap();
        assert!((iou - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_overlap() {
        let iou = calculate_iou(&bbox(0, 0, 10, 10), &bbox(20, 20, 10, 10)).unwrap();
        assert_eq!(iou, 0.0);
    }

    #[test]
    fn test_touching_edges() {
        let iou = calculate_iou(&bbox(0, 0, 10, 10), &bbox(10, 0, 10, 10)).unwrap();
        assert_eq!(iou, 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // Intersection: 5x5 = 25
        // Union: 100 + 100 - 25 = 175
        let iou = calculate_iou(&bbox(0, 0, 10, 10), &bbox(5, 5, 10, 10)).unwrap();
        assert!((iou - 25.0 / 175.0).abs() < 1e-12);
    }

    #[test]
    fn test_offset_by_six() {
        // Intersection: 4x4 = 16, union: 184
        let iou = calculate_iou(&bbox(0, 0, 10, 10), &bbox(6, 6, 10, 10)).unwrap();
        assert!((iou - 16.0 / 184.0).abs() < 1e-12);
        assert!(iou < 0.5);
    }

    #[test]
    fn test_contained_box() {
        let iou = calculate_iou(&bbox(0, 0, 10, 10), &bbox(0, 0, 5, 10)).unwrap();
        assert!((iou - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let a = bbox(0, 0, 3_000_000_000, 3_000_000_000);
        let b = bbox(0, 0, 3_000_000_000, 1_500_000_000);
        let iou = calculate_iou(&a, &b).unwrap();
        assert!((iou - 0.5).abs() < 1e-12);

        // Far apart on both sides of zero
        let left = bbox(i64::MIN, i64::MIN, 10, 10);
        let right = bbox(i64::MAX - 10, i64::MAX - 10, 10, 10);
        assert_eq!(calculate_iou(&left, &right).unwrap(), 0.0);

        // Unchecked boxes whose corners leave the i64 range still compute
        let wide = BoundingBox::new_unchecked(2, 1, 1, i64::MAX - 1, 0, i64::MAX, i64::MAX);
        assert_eq!(calculate_iou(&wide, &wide).unwrap(), 1.0);
    }

    #[test]
    fn test_degenerate_box_fails() {
        let degenerate = BoundingBox::new_unchecked(9, 1, 1, 0, 0, 0, 10);
        let err = calculate_iou(&bbox(0, 0, 10, 10), &degenerate).unwrap_err();
        assert!(matches!(
            err,
            EvalError::DegenerateBox {
                annotation_id: 9,
                width: 0,
                height: 10
            }
        ));
    }
}
