//! Live surface-quality feedback.
//!
//! Analysis is too costly to run on every frame, so the monitor samples at a
//! fixed interval (by frame timestamp) and keeps the latest report. The
//! capture workflow stamps new walls with the monitor's current surface type
//! and quality.

use super::surface::{SurfaceAnalyzer, SurfaceReport, SurfaceType};
use crate::capture::Frame;
use std::time::{Duration, Instant};

/// Default spacing between analyzed frames.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Samples frames on a fixed cadence and keeps the latest report.
pub struct QualityMonitor {
    analyzer: SurfaceAnalyzer,
    interval: Duration,
    last_sample: Option<Instant>,
    latest: Option<SurfaceReport>,
    samples: u64,
}

impl QualityMonitor {
    /// Creates a monitor that analyzes at most one frame per `interval`.
    pub fn new(analyzer: SurfaceAnalyzer, interval: Duration) -> Self {
        Self {
            analyzer,
            interval,
            last_sample: None,
            latest: None,
            samples: 0,
        }
    }

    /// True if a frame captured at `at` should be analyzed.
    pub fn is_due(&self, at: Instant) -> bool {
        match self.last_sample {
            None => true,
            Some(last) => at.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Analyzes the frame if the sampling interval has elapsed.
    ///
    /// Returns the new report, or `None` when the frame was skipped or the
    /// capture buffer was not ready. Skipped frames leave the latest report
    /// untouched.
    pub fn sample(&mut self, frame: &Frame) -> Option<&SurfaceReport> {
        let at = frame.timestamp();
        if !self.is_due(at) {
            return None;
        }
        self.last_sample = Some(at);

        let report = self.analyzer.analyze(frame)?;
        self.samples += 1;

        let previous = self.latest.map(|r| r.surface_type);
        if previous != Some(report.surface_type) {
            tracing::info!(
                surface = %report.surface_type,
                quality = report.quality,
                "Surface type changed"
            );
        }

        self.latest = Some(report);
        self.latest.as_ref()
    }

    /// Most recent report, if any frame was analyzed.
    pub fn latest(&self) -> Option<&SurfaceReport> {
        self.latest.as_ref()
    }

    /// Surface type to stamp on a captured wall.
    pub fn surface_type(&self) -> SurfaceType {
        self.latest.map(|r| r.surface_type).unwrap_or_default()
    }

    /// Quality to stamp on a captured wall (0 before any sample).
    pub fn quality(&self) -> u8 {
        self.latest.map_or(0, |r| r.quality)
    }

    /// Number of frames analyzed.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Clears the latest report, e.g. when a new scan starts.
    pub fn reset(&mut self) {
        self.last_sample = None;
        self.latest = None;
        tracing::debug!("Quality monitor reset");
    }
}

impl Default for QualityMonitor {
    fn default() -> Self {
        Self::new(SurfaceAnalyzer::default(), DEFAULT_SAMPLE_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(at: Instant, sequence: u64) -> Frame {
        Frame::solid(8, 8, [255, 255, 255, 255], sequence).with_timestamp(at)
    }

    #[test]
    fn test_defaults_before_sampling() {
        let monitor = QualityMonitor::default();
        assert!(monitor.latest().is_none());
        assert_eq!(monitor.surface_type(), SurfaceType::Wall);
        assert_eq!(monitor.quality(), 0);
    }

    #[test]
    fn test_samples_on_interval() {
        let mut monitor = QualityMonitor::default();
        let start = Instant::now();

        assert!(monitor.sample(&frame_at(start, 1)).is_some());
        assert!(monitor.sample(&frame_at(start + Duration::from_millis(100), 2)).is_none());
        assert!(monitor.sample(&frame_at(start + Duration::from_millis(499), 3)).is_none());
        assert!(monitor.sample(&frame_at(start + Duration::from_millis(500), 4)).is_some());

        assert_eq!(monitor.samples(), 2);
        assert_eq!(monitor.surface_type(), SurfaceType::SmoothWall);
        assert_eq!(monitor.quality(), 100);
    }

    #[test]
    fn test_unready_frame_keeps_previous_report() {
        let mut monitor = QualityMonitor::new(SurfaceAnalyzer::default(), Duration::ZERO);
        monitor.sample(&frame_at(Instant::now(), 1));

        assert!(monitor.sample(&Frame::new(Vec::new(), 0, 0, 2)).is_none());
        assert_eq!(monitor.quality(), 100);
    }

    #[test]
    fn test_reset() {
        let mut monitor = QualityMonitor::default();
        let start = Instant::now();
        monitor.sample(&frame_at(start, 1));
        monitor.reset();

        assert!(monitor.latest().is_none());
        assert!(monitor.is_due(start));
    }
}
