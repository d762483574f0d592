//! Box geometry and non-maximum suppression.

/// Axis-aligned box in corner form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// A box from its top-left corner and size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Converts a center-form box `(cx, cy, w, h)`.
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Intersection over union. Disjoint or degenerate pairs give 0.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix_min = self.x.max(other.x);
        let iy_min = self.y.max(other.y);
        let ix_max = (self.x + self.width).min(other.x + other.width);
        let iy_max = (self.y + self.height).min(other.y + other.height);

        if ix_min >= ix_max || iy_min >= iy_max {
            return 0.0;
        }

        let intersection = (ix_max - ix_min) * (iy_max - iy_min);
        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Divides every coordinate by `size`.
    pub fn scaled_down(&self, size: f32) -> Self {
        Self::new(
            self.x / size,
            self.y / size,
            self.width / size,
            self.height / size,
        )
    }
}

/// A decoded candidate before semantic mapping.
///
/// `class_index` is `None` when the record carried no class scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub class_index: Option<usize>,
}

/// Greedy class-agnostic NMS.
///
/// Candidates are stably sorted by confidence (descending); a candidate is
/// kept unless its IOU with an already-kept one exceeds `iou_threshold`.
/// Equal confidences keep their input order.
pub fn non_max_suppression(
    mut candidates: Vec<RawDetection>,
    iou_threshold: f32,
) -> Vec<RawDetection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<RawDetection> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let overlaps = kept
            .iter()
            .any(|k| k.bbox.iou(&candidate.bbox) > iou_threshold);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn det(x: f32, y: f32, w: f32, h: f32, confidence: f32) -> RawDetection {
        RawDetection {
            bbox: BoundingBox::new(x, y, w, h),
            confidence,
            class_index: Some(0),
        }
    }

    #[test]
    fn test_self_iou_is_one() {
        let b = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        assert_relative_eq!(b.iou(&b), 1.0);
    }

    #[test]
    fn test_disjoint_iou_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 20.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);

        // Touching edges share no area
        let c = BoundingBox::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(a.iou(&c), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 10.0, 10.0);
        // 50 / (100 + 100 - 50)
        assert_relative_eq!(a.iou(&b), 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_box() {
        let a = BoundingBox::new(0.0, 0.0, 0.0, 10.0);
        assert_eq!(a.iou(&a), 0.0);
    }

    #[test]
    fn test_center_conversion() {
        let b = BoundingBox::from_center(50.0, 40.0, 20.0, 10.0);
        assert_eq!(b, BoundingBox::new(40.0, 35.0, 20.0, 10.0));
    }

    #[test]
    fn test_suppresses_lower_confidence_duplicate() {
        let kept = non_max_suppression(
            vec![
                det(0.0, 0.0, 10.0, 10.0, 0.7),
                det(1.0, 1.0, 10.0, 10.0, 0.9),
                det(50.0, 50.0, 10.0, 10.0, 0.6),
            ],
            0.4,
        );

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[1].confidence, 0.6);
    }

    #[test]
    fn test_equal_confidence_keeps_input_order() {
        let kept = non_max_suppression(
            vec![
                det(0.0, 0.0, 10.0, 10.0, 0.8),
                det(0.5, 0.5, 10.0, 10.0, 0.8),
            ],
            0.4,
        );

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bbox.x, 0.0);
    }

    #[test]
    fn test_iou_at_threshold_not_suppressed() {
        // IOU exactly 1/3 against a threshold of 1/3 is not "exceeding"
        let a = det(0.0, 0.0, 10.0, 10.0, 0.9);
        let b = det(5.0, 0.0, 10.0, 10.0, 0.8);
        let iou = a.bbox.iou(&b.bbox);

        let kept = non_max_suppression(vec![a, b], iou);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(non_max_suppression(Vec::new(), 0.4).is_empty());
    }

    fn arb_detection() -> impl Strategy<Value = RawDetection> {
        (0.0f32..600.0, 0.0f32..600.0, 1.0f32..120.0, 1.0f32..120.0, 0.0f32..1.0)
            .prop_map(|(x, y, w, h, c)| det(x, y, w, h, c))
    }

    proptest! {
        #[test]
        fn prop_kept_pairs_within_threshold(
            dets in prop::collection::vec(arb_detection(), 0..40),
            threshold in 0.05f32..0.95,
        ) {
            let kept = non_max_suppression(dets, threshold);
            for (i, a) in kept.iter().enumerate() {
                for b in &kept[i + 1..] {
                    prop_assert!(a.bbox.iou(&b.bbox) <= threshold);
                }
            }
        }

        #[test]
        fn prop_nms_idempotent(
            dets in prop::collection::vec(arb_detection(), 0..40),
            threshold in 0.05f32..0.95,
        ) {
            let once = non_max_suppression(dets, threshold);
            let twice = non_max_suppression(once.clone(), threshold);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_kept_sorted_by_confidence(
            dets in prop::collection::vec(arb_detection(), 0..40),
        ) {
            let kept = non_max_suppression(dets, 0.4);
            prop_assert!(kept.windows(2).all(|w| w[0].confidence >= w[1].confidence));
        }

        #[test]
        fn prop_iou_symmetric_and_bounded(a in arb_detection(), b in arb_detection()) {
            let ab = a.bbox.iou(&b.bbox);
            let ba = b.bbox.iou(&a.bbox);
            prop_assert!(ab >= 0.0 && ab <= 1.0 + 1e-5);
            prop_assert!((ab - ba).abs() < 1e-6);
        }
    }
}
