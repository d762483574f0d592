//! Surface analysis and live quality feedback.
//!
//! Provides the per-frame surface heuristics (brightness, color, edge
//! density) and a monitor that samples them on a fixed cadence. These are
//! guidance for the person scanning, not measurements.

mod monitor;
mod surface;

pub use monitor::{QualityMonitor, DEFAULT_SAMPLE_INTERVAL};
pub use surface::{
    quality_score, ChannelMeans, SurfaceAnalyzer, SurfaceReport, SurfaceType,
    DEFAULT_EDGE_THRESHOLD,
};
