//! Prometheus metrics exporter for scanner monitoring.
//!
//! # Metrics Exposed
//!
//! ## Surface Analysis
//! - `wall_scanner_frames_analyzed_total` - Frames analyzed for surface quality
//! - `wall_scanner_surface_quality` - Quality score of the latest frame (0-100)
//! - `wall_scanner_edge_density` - Edge density of the latest frame
//!
//! ## Detection
//! - `wall_scanner_detection_runs_total` - Detection runs
//! - `wall_scanner_detection_failures_total` - Runs that failed and returned nothing
//! - `wall_scanner_elements_detected_total` - Elements kept after suppression
//! - `wall_scanner_stale_detections_total` - Results discarded as out of order
//! - `wall_scanner_session_ready` - Inference session status (1=ready)
//!
//! ## Room
//! - `wall_scanner_walls_captured` - Walls in the current scan
//! - `wall_scanner_room_regenerations_total` - Room model regenerations
//!
//! With the `metrics` feature, [`MetricsServer`] serves these at `/metrics`
//! alongside `/health` and the latest room export at `/room`.
//!
//! # Example
//!
//! ```no_run
//! use wall_scanner::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     frames_analyzed: 40,
//!     surface_quality: Some(86),
//!     walls_captured: 2,
//!     session_ready: true,
//!     ..MetricsSnapshot::default()
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
