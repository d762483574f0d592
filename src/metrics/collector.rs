//! Metrics collection and registry.

use crate::analysis::QualityMonitor;
use crate::detection::{DetectorStats, SessionState};
use crate::room::RoomAssembler;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of scanner state for metrics update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// Frames the quality monitor analyzed.
    pub frames_analyzed: u64,
    /// Quality of the latest analyzed frame.
    pub surface_quality: Option<u8>,
    /// Edge density of the latest analyzed frame.
    pub edge_density: Option<f64>,
    pub detection_runs: u64,
    pub detection_failures: u64,
    /// Elements kept after suppression, over all runs.
    pub elements_detected: u64,
    pub stale_discarded: u64,
    pub walls_captured: usize,
    pub room_regenerations: u64,
    pub session_ready: bool,
}

/// Prometheus metrics registry for the scanner.
pub struct MetricsRegistry {
    registry: Registry,

    // Surface analysis
    frames_analyzed: IntCounter,
    surface_quality: IntGauge,
    edge_density: Gauge,

    // Detection
    detection_runs: IntCounter,
    detection_failures: IntCounter,
    elements_detected: IntCounter,
    stale_discarded: IntCounter,
    session_ready: IntGauge,

    // Room
    walls_captured: IntGauge,
    room_regenerations: IntCounter,
}

impl MetricsRegistry {
    /// Creates a registry with all scanner metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_analyzed = IntCounter::new(
            "wall_scanner_frames_analyzed_total",
            "Total number of frames analyzed for surface quality",
        )?;
        let surface_quality = IntGauge::new(
            "wall_scanner_surface_quality",
            "Quality score of the latest analyzed frame (0-100)",
        )?;
        let edge_density = Gauge::new(
            "wall_scanner_edge_density",
            "Edge density of the latest analyzed frame",
        )?;

        let detection_runs = IntCounter::new(
            "wall_scanner_detection_runs_total",
            "Total number of detection runs",
        )?;
        let detection_failures = IntCounter::new(
            "wall_scanner_detection_failures_total",
            "Detection runs that failed and returned no elements",
        )?;
        let elements_detected = IntCounter::new(
            "wall_scanner_elements_detected_total",
            "Total elements kept after non-maximum suppression",
        )?;
        let stale_discarded = IntCounter::new(
            "wall_scanner_stale_detections_total",
            "Detections discarded because a newer frame finished first",
        )?;
        let session_ready = IntGauge::new(
            "wall_scanner_session_ready",
            "Inference session status (1=ready, 0=not loaded)",
        )?;

        let walls_captured = IntGauge::new(
            "wall_scanner_walls_captured",
            "Walls captured in the current scan",
        )?;
        let room_regenerations = IntCounter::new(
            "wall_scanner_room_regenerations_total",
            "Total number of room model regenerations",
        )?;

        registry.register(Box::new(frames_analyzed.clone()))?;
        registry.register(Box::new(surface_quality.clone()))?;
        registry.register(Box::new(edge_density.clone()))?;
        registry.register(Box::new(detection_runs.clone()))?;
        registry.register(Box::new(detection_failures.clone()))?;
        registry.register(Box::new(elements_detected.clone()))?;
        registry.register(Box::new(stale_discarded.clone()))?;
        registry.register(Box::new(session_ready.clone()))?;
        registry.register(Box::new(walls_captured.clone()))?;
        registry.register(Box::new(room_regenerations.clone()))?;

        Ok(Self {
            registry,
            frames_analyzed,
            surface_quality,
            edge_density,
            detection_runs,
            detection_failures,
            elements_detected,
            stale_discarded,
            session_ready,
            walls_captured,
            room_regenerations,
        })
    }

    /// Updates all metrics from a snapshot of scanner state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        advance(&self.frames_analyzed, snapshot.frames_analyzed);
        if let Some(quality) = snapshot.surface_quality {
            self.surface_quality.set(quality as i64);
        }
        if let Some(density) = snapshot.edge_density {
            self.edge_density.set(density);
        }

        advance(&self.detection_runs, snapshot.detection_runs);
        advance(&self.detection_failures, snapshot.detection_failures);
        advance(&self.elements_detected, snapshot.elements_detected);
        advance(&self.stale_discarded, snapshot.stale_discarded);
        self.session_ready.set(if snapshot.session_ready { 1 } else { 0 });

        // Drops back to zero when a scan is reset
        self.walls_captured.set(snapshot.walls_captured as i64);
        advance(&self.room_regenerations, snapshot.room_regenerations);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Counters only move forward; bump by the difference to `total`.
fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from the current state of scanner components.
    pub fn from_components(
        monitor: &QualityMonitor,
        detector: &DetectorStats,
        session: SessionState,
        assembler: &RoomAssembler,
    ) -> Self {
        let latest = monitor.latest();
        Self {
            frames_analyzed: monitor.samples(),
            surface_quality: latest.map(|r| r.quality),
            edge_density: latest.map(|r| r.edge_density),
            detection_runs: detector.runs,
            detection_failures: detector.failures,
            elements_detected: detector.elements,
            stale_discarded: detector.stale_discarded,
            walls_captured: assembler.walls().len(),
            room_regenerations: assembler.regenerations(),
            session_ready: session == SessionState::Ready,
        }
    }
}
