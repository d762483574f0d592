//! Fixture detection pipeline.
//!
//! ```text
//! Frame → FrameEncoder → InferenceSession (engine) → DetectionDecoder → Elements
//! ```
//!
//! Detection is best-effort: an unusable frame, an engine failure or a
//! malformed output all produce an empty element list, never an error.

mod decoder;
mod element;
mod engine;
mod nms;
mod session;

pub use decoder::{DecoderConfig, DetectionDecoder, OutputLayout};
pub use element::{Element, ElementType};
pub use engine::{
    EngineConfig, EngineError, InferenceEngine, ScriptedEngine, ScriptedSession, SessionOutputs,
};
pub use nms::{non_max_suppression, BoundingBox, RawDetection};
pub use session::{InferenceSession, SessionState};

use crate::capture::Frame;
use crate::config::DetectionConfig;
use crate::encoding::{EncodeError, FrameEncoder};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Why a detection produced no elements.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("frame unavailable")]
    FrameUnavailable,
    #[error("failed to encode frame: {0}")]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Elements detected on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Sequence number of the source frame.
    pub sequence: u64,
    pub elements: Vec<Element>,
}

/// Accepts results in frame order and rejects ones that arrive late.
#[derive(Debug, Default)]
pub struct ResultGate {
    newest: AtomicU64,
}

impl ResultGate {
    /// A gate that has accepted nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `sequence`; false if a newer result was already accepted.
    pub fn accept(&self, sequence: u64) -> bool {
        let previous = self.newest.fetch_max(sequence, Ordering::AcqRel);
        sequence >= previous
    }

    /// Newest accepted sequence (0 before any).
    pub fn newest(&self) -> u64 {
        self.newest.load(Ordering::Acquire)
    }

    /// Forgets the newest sequence, for a source that restarts numbering.
    pub fn reset(&self) {
        self.newest.store(0, Ordering::Release);
    }
}

/// Running totals for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorStats {
    pub runs: u64,
    pub failures: u64,
    pub elements: u64,
    pub stale_discarded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    runs: AtomicU64,
    failures: AtomicU64,
    elements: AtomicU64,
    stale_discarded: AtomicU64,
}

/// Encodes frames, runs the session and decodes the output.
pub struct Detector<E: InferenceEngine> {
    session: InferenceSession<E>,
    encoder: FrameEncoder,
    decoder: DetectionDecoder,
    input_name: String,
    gate: ResultGate,
    counters: Counters,
}

impl<E: InferenceEngine> Detector<E> {
    /// Assembles a detector from its parts.
    pub fn new(
        session: InferenceSession<E>,
        encoder: FrameEncoder,
        decoder: DetectionDecoder,
        input_name: impl Into<String>,
    ) -> Self {
        Self {
            session,
            encoder,
            decoder,
            input_name: input_name.into(),
            gate: ResultGate::new(),
            counters: Counters::default(),
        }
    }

    /// Builds a detector from the `[detection]` config section.
    pub fn from_config(engine: E, config: &DetectionConfig) -> Self {
        let session = InferenceSession::new(engine, config.engine.clone());
        let decoder = DetectionDecoder::new(DecoderConfig {
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            input_size: config.input_size as f32,
            layout: OutputLayout::default(),
        });
        Self::new(
            session,
            FrameEncoder::new(config.input_size),
            decoder,
            config.input_name.clone(),
        )
    }

    /// The session backing this detector.
    pub fn session(&self) -> &InferenceSession<E> {
        &self.session
    }

    /// Starts ordering results afresh, e.g. when a new frame source is opened.
    pub fn begin_scan(&self) {
        tracing::debug!(previous = self.gate.newest(), "Resetting result ordering");
        self.gate.reset();
    }

    /// Detects fixtures on `frame`.
    ///
    /// Frames that are not already square at the model input size are
    /// stretched to it first.
    pub async fn detect(&self, frame: &Frame) -> Detection {
        let sequence = frame.sequence();
        self.counters.runs.fetch_add(1, Ordering::Relaxed);

        let elements = match self.try_detect(frame).await {
            Ok(elements) => elements,
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(sequence, error = %e, "Detection failed; returning no elements");
                Vec::new()
            }
        };

        self.counters
            .elements
            .fetch_add(elements.len() as u64, Ordering::Relaxed);
        tracing::debug!(sequence, elements = elements.len(), "Detection complete");
        Detection { sequence, elements }
    }

    /// Like [`detect`](Self::detect) but returns `None` when a newer frame's
    /// result has already been accepted.
    pub async fn detect_latest(&self, frame: &Frame) -> Option<Detection> {
        let detection = self.detect(frame).await;
        if self.gate.accept(detection.sequence) {
            Some(detection)
        } else {
            self.counters.stale_discarded.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                sequence = detection.sequence,
                newest = self.gate.newest(),
                "Discarding stale detection"
            );
            None
        }
    }

    /// Detects fixtures on `frame`, reporting why nothing could be run.
    pub async fn try_detect(&self, frame: &Frame) -> Result<Vec<Element>, DetectError> {
        let input = frame
            .resized_square(self.encoder.input_size())
            .ok_or(DetectError::FrameUnavailable)?;
        let tensor = self.encoder.encode(&input)?;
        let outputs = self.session.run(&self.input_name, tensor).await?;
        Ok(self.decoder.decode(outputs.primary()))
    }

    /// Releases the underlying session.
    pub async fn release(&self) {
        self.session.release().await;
    }

    /// Totals since the detector was built.
    pub fn stats(&self) -> DetectorStats {
        DetectorStats {
            runs: self.counters.runs.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            elements: self.counters.elements.load(Ordering::Relaxed),
            stale_discarded: self.counters.stale_discarded.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Tensor;

    fn config() -> DetectionConfig {
        DetectionConfig {
            input_size: 32,
            ..DetectionConfig::default()
        }
    }

    fn outlet_output() -> Tensor {
        // Centered 8x8 outlet on a 32px input
        Tensor::from_records(&[vec![16.0, 16.0, 8.0, 8.0, 0.9, 0.8, 0.1, 0.0, 0.0]]).unwrap()
    }

    #[tokio::test]
    async fn test_detects_and_normalizes() {
        let detector = Detector::from_config(ScriptedEngine::with_output(outlet_output()), &config());
        let frame = Frame::solid(64, 48, [200, 200, 200, 255], 1);

        let detection = detector.detect(&frame).await;

        assert_eq!(detection.sequence, 1);
        assert_eq!(detection.elements.len(), 1);
        assert_eq!(detection.elements[0].kind, ElementType::Outlet);
        assert_eq!(detection.elements[0].x, 0.375);
        assert_eq!(detector.session().state().await, SessionState::Ready);
    }

    #[tokio::test]
    async fn test_empty_frame_yields_nothing() {
        let detector = Detector::from_config(ScriptedEngine::with_output(outlet_output()), &config());
        let frame = Frame::new(Vec::new(), 0, 0, 1);

        assert!(detector.detect(&frame).await.elements.is_empty());
        assert_eq!(detector.session().engine().run_count(), 0);
        assert_eq!(detector.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_engine_failures_yield_nothing() {
        let frame = Frame::solid(32, 32, [0, 0, 0, 255], 1);

        let load_fails = Detector::from_config(ScriptedEngine::silent().failing_load(), &config());
        assert!(load_fails.detect(&frame).await.elements.is_empty());

        let run_fails = Detector::from_config(
            ScriptedEngine::with_output(outlet_output()).failing_run(),
            &config(),
        );
        assert!(run_fails.detect(&frame).await.elements.is_empty());
        assert_eq!(run_fails.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_missing_output_yields_nothing() {
        let detector = Detector::from_config(ScriptedEngine::silent(), &config());
        let frame = Frame::solid(32, 32, [0, 0, 0, 255], 1);

        let detection = detector.detect(&frame).await;
        assert!(detection.elements.is_empty());
        assert_eq!(detector.stats().failures, 0);
    }

    #[tokio::test]
    async fn test_stale_results_discarded() {
        let detector = Detector::from_config(ScriptedEngine::with_output(outlet_output()), &config());
        let newer = Frame::solid(32, 32, [0, 0, 0, 255], 5);
        let older = Frame::solid(32, 32, [0, 0, 0, 255], 3);

        assert!(detector.detect_latest(&newer).await.is_some());
        assert!(detector.detect_latest(&older).await.is_none());
        assert_eq!(detector.stats().stale_discarded, 1);
    }

    #[tokio::test]
    async fn test_try_detect_reports_cause() {
        let detector = Detector::from_config(
            ScriptedEngine::with_output(outlet_output()).failing_run(),
            &config(),
        );

        let empty = Frame::new(Vec::new(), 0, 0, 1);
        assert!(matches!(
            detector.try_detect(&empty).await,
            Err(DetectError::FrameUnavailable)
        ));

        let frame = Frame::solid(32, 32, [0, 0, 0, 255], 2);
        assert!(matches!(
            detector.try_detect(&frame).await,
            Err(DetectError::Engine(EngineError::RunFailed(_)))
        ));
    }

    #[tokio::test]
    async fn test_new_scan_restarts_ordering() {
        let detector = Detector::from_config(ScriptedEngine::with_output(outlet_output()), &config());

        for sequence in 1..=3 {
            let frame = Frame::solid(32, 32, [0, 0, 0, 255], sequence);
            assert!(detector.detect_latest(&frame).await.is_some());
        }

        // A reopened source numbers its frames from 1 again
        detector.begin_scan();
        for sequence in 1..=3 {
            let frame = Frame::solid(32, 32, [0, 0, 0, 255], sequence);
            let detection = detector.detect_latest(&frame).await;
            assert_eq!(detection.map(|d| d.sequence), Some(sequence));
        }
        assert_eq!(detector.stats().stale_discarded, 0);
    }

    #[test]
    fn test_gate_ordering() {
        let gate = ResultGate::new();
        assert!(gate.accept(1));
        assert!(gate.accept(4));
        assert!(!gate.accept(2));
        assert!(gate.accept(4));
        assert_eq!(gate.newest(), 4);

        gate.reset();
        assert_eq!(gate.newest(), 0);
        assert!(gate.accept(1));
    }
}
