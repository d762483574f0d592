//! Wall Scanner Core
//!
//! Fixture detection, surface analysis and room assembly for an AR wall
//! scanner. Camera frames go in; detected outlets, switches, windows and
//! doors, a live surface-quality score, and an exportable 3D room model
//! come out.
//!
//! # Architecture
//!
//! ```text
//! capture → encoding → detection ─┐
//!     ↓                           ├→ room → projection
//!     └──→ analysis (quality) ────┘
//! ```
//!
//! # Design Principles
//!
//! - **Best-effort detection**: engine or input failures yield no elements, never errors
//! - **Injectable inference**: the model runtime sits behind [`detection::InferenceEngine`]
//! - **Snapshot models**: a generated room never changes under its reader
//!
//! # Example
//!
//! ```no_run
//! use wall_scanner::{
//!     analysis::QualityMonitor,
//!     capture::{FrameSource, SyntheticWall},
//!     config::ScannerConfig,
//!     detection::{Detector, ScriptedEngine},
//!     projection::{Rotation, SceneProjector},
//!     room::RoomAssembler,
//! };
//!
//! # async fn scan() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScannerConfig::default();
//! let detector = Detector::from_config(ScriptedEngine::silent(), &config.detection);
//! let mut monitor = config.analysis.monitor();
//! let mut room = RoomAssembler::new(config.room.clone());
//!
//! let mut camera = SyntheticWall::new(320, 240, [240, 240, 235]);
//! camera.open()?;
//!
//! for _ in 0..2 {
//!     let frame = camera.next_frame()?;
//!     monitor.sample(&frame);
//!     let detection = detector.detect(&frame).await;
//!     room.capture_wall(detection.elements, monitor.latest());
//! }
//!
//! if let Some(model) = room.model() {
//!     let faces = SceneProjector::from_config(&config.projection).project(model, Rotation::default());
//!     assert_eq!(faces.len(), 6);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod capture;
pub mod config;
pub mod detection;
pub mod encoding;
pub mod metrics;
pub mod projection;
pub mod room;

// Re-export commonly used types at crate root
pub use analysis::{QualityMonitor, SurfaceAnalyzer, SurfaceReport, SurfaceType};
pub use capture::{Frame, FrameSource, SyntheticWall};
pub use config::ScannerConfig;
pub use detection::{Detector, DetectionDecoder, Element, ElementType, InferenceEngine, InferenceSession};
pub use encoding::{FrameEncoder, Tensor};
pub use projection::{DrawableFace, Rotation, SceneProjector};
pub use room::{RoomAssembler, RoomModel, Wall};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
