//! YOLO-style output decoding.
//!
//! The engine output is `[batch, candidates, record]` where each record is
//! `[cx, cy, w, h, confidence, class scores...]` in model-input pixels.
//! Decoding is best-effort: anything malformed decodes to no elements.

use super::element::{Element, ElementType};
use super::nms::{non_max_suppression, BoundingBox, RawDetection};
use crate::encoding::Tensor;
use std::ops::Range;

/// Positions of the fields inside one candidate record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Index of `cx`; `cy`, `w`, `h` follow contiguously.
    pub box_offset: usize,
    /// Index of the objectness confidence.
    pub confidence_index: usize,
    /// First class score.
    pub class_scores_start: usize,
    /// One past the last class score; `None` runs to the end of the record.
    pub class_scores_end: Option<usize>,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            box_offset: 0,
            confidence_index: 4,
            class_scores_start: 5,
            class_scores_end: None,
        }
    }
}

impl OutputLayout {
    /// Smallest record that holds the box and the confidence.
    fn min_record_size(&self) -> usize {
        (self.box_offset + 4).max(self.confidence_index + 1)
    }

    /// Class-score slice bounds for a record of `record_size` values.
    fn class_range(&self, record_size: usize) -> Range<usize> {
        let end = self
            .class_scores_end
            .unwrap_or(record_size)
            .min(record_size);
        let start = self.class_scores_start.min(end);
        start..end
    }
}

/// Decoder thresholds and geometry.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Candidates with confidence at or below this are rejected.
    pub confidence_threshold: f32,
    /// Later candidates overlapping a kept one above this IOU are dropped.
    pub iou_threshold: f32,
    /// Model input side length used to normalize boxes.
    pub input_size: f32,
    pub layout: OutputLayout,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            iou_threshold: 0.4,
            input_size: 640.0,
            layout: OutputLayout::default(),
        }
    }
}

/// Turns raw engine output into typed, deduplicated elements.
#[derive(Debug, Clone, Default)]
pub struct DetectionDecoder {
    config: DecoderConfig,
}

impl DetectionDecoder {
    /// Creates a decoder with the given thresholds and record layout.
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Returns the decoder configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes an engine output into elements in suppression-kept order.
    ///
    /// Returns an empty list for a missing or malformed tensor.
    pub fn decode(&self, output: Option<&Tensor>) -> Vec<Element> {
        let Some(output) = output else {
            tracing::debug!("No output tensor to decode");
            return Vec::new();
        };

        let Some(candidates) = self.parse_candidates(output) else {
            tracing::warn!(dims = ?output.dims(), "Malformed detection output");
            return Vec::new();
        };
        let parsed = candidates.len();

        let kept = non_max_suppression(candidates, self.config.iou_threshold);
        let suppressed = parsed - kept.len();

        let elements: Vec<Element> = kept
            .into_iter()
            .filter_map(|det| {
                let kind = det.class_index.and_then(ElementType::from_class_index)?;
                Some((kind, det))
            })
            .enumerate()
            .map(|(id, (kind, det))| self.to_element(id as u32, kind, &det))
            .collect();

        tracing::debug!(
            candidates = parsed,
            suppressed,
            elements = elements.len(),
            "Decoded detections"
        );
        elements
    }

    /// Parses records above the confidence threshold from the first batch.
    /// Records with a non-finite confidence or box value are skipped.
    ///
    /// `None` means the tensor does not have the expected layout.
    pub fn parse_candidates(&self, output: &Tensor) -> Option<Vec<RawDetection>> {
        let dims = output.dims();
        if dims.len() < 3 || dims[0] == 0 {
            return None;
        }
        let (count, record_size) = (dims[1], dims[2]);
        let layout = &self.config.layout;
        if record_size < layout.min_record_size() {
            return None;
        }

        let data = output.data();
        let needed = count.checked_mul(record_size)?;
        if data.len() < needed {
            return None;
        }

        let classes = layout.class_range(record_size);
        let threshold = self.config.confidence_threshold;

        let candidates = data[..needed]
            .chunks_exact(record_size)
            .filter_map(|record| {
                let confidence = record[layout.confidence_index];
                if !confidence.is_finite() || confidence <= threshold {
                    return None;
                }
                let b = &record[layout.box_offset..layout.box_offset + 4];
                if !b.iter().all(|v| v.is_finite()) {
                    return None;
                }
                Some(RawDetection {
                    bbox: BoundingBox::from_center(b[0], b[1], b[2], b[3]),
                    confidence,
                    class_index: argmax(&record[classes.clone()]),
                })
            })
            .collect();

        Some(candidates)
    }

    fn to_element(&self, id: u32, kind: ElementType, det: &RawDetection) -> Element {
        let bbox = det.bbox.scaled_down(self.config.input_size);
        Element {
            id,
            kind,
            x: bbox.x,
            y: bbox.y,
            width: bbox.width,
            height: bbox.height,
            confidence: det.confidence,
            depth_offset: kind.depth_offset(),
            color: kind.color().to_string(),
        }
    }
}

/// Index of the largest score; the first one wins on ties.
fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
        .map(|(i, _)| i)
}
