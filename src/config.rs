//! Scanner configuration.
//!
//! Loaded from a TOML file where every section is optional and falls back
//! to the defaults the live scanner ships with.

use crate::analysis::{QualityMonitor, SurfaceAnalyzer, DEFAULT_EDGE_THRESHOLD};
use crate::detection::EngineConfig;
use crate::encoding::DEFAULT_INPUT_SIZE;
use crate::room::texture;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Fixture detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    #[serde(flatten)]
    pub engine: EngineConfig,
    /// Side of the square model input in pixels.
    pub input_size: u32,
    /// Candidates at or below this score are dropped.
    pub confidence_threshold: f32,
    /// Overlap above which the weaker box is suppressed.
    pub iou_threshold: f32,
    /// Name of the model's input tensor.
    pub input_name: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold: 0.5,
            iou_threshold: 0.4,
            input_name: "images".to_string(),
        }
    }
}

impl DetectionConfig {
    /// Checks the input size and that both thresholds lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_size == 0 {
            return Err(ConfigError::InvalidInputSize);
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::InvalidThreshold("confidence_threshold"));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ConfigError::InvalidThreshold("iou_threshold"));
        }
        Ok(())
    }
}

/// Surface analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Red-channel gradient above which a pixel counts as an edge.
    pub edge_threshold: u16,
    /// Minimum spacing between analyzed frames.
    pub sample_interval_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            sample_interval_ms: 500,
        }
    }
}

impl AnalysisConfig {
    /// Minimum spacing between analyzed frames.
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Builds a monitor with these settings.
    pub fn monitor(&self) -> QualityMonitor {
        QualityMonitor::new(
            SurfaceAnalyzer::with_edge_threshold(self.edge_threshold),
            self.sample_interval(),
        )
    }
}

/// Preview projection settings. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub focal_distance: f64,
    pub scale: f64,
    pub pitch: f64,
    pub yaw: f64,
    /// Yaw advanced per auto-rotate tick.
    pub auto_rotate_step: f64,
    pub auto_rotate_interval_ms: u64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            focal_distance: 800.0,
            scale: 60.0,
            pitch: 20.0,
            yaw: 45.0,
            auto_rotate_step: 1.0,
            auto_rotate_interval_ms: 50,
        }
    }
}

impl ProjectionConfig {
    /// Requires a positive, finite focal distance and scale.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive(self.focal_distance) {
            return Err(ConfigError::InvalidDimension("focal_distance"));
        }
        if !is_positive(self.scale) {
            return Err(ConfigError::InvalidDimension("scale"));
        }
        Ok(())
    }
}

/// Room assembly settings. Lengths are in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub wall_width: f64,
    pub wall_height: f64,
    /// Walls required before a room model is generated.
    pub min_walls: usize,
    pub default_texture: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: 3.5,
            depth: 3.5,
            height: 2.7,
            wall_width: 3.5,
            wall_height: 2.7,
            min_walls: 2,
            default_texture: texture::DEFAULT_TEXTURE_ID.to_string(),
        }
    }
}

impl RoomConfig {
    /// Checks dimensions, the wall minimum and the default texture.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lengths = [
            ("width", self.width),
            ("depth", self.depth),
            ("height", self.height),
            ("wall_width", self.wall_width),
            ("wall_height", self.wall_height),
        ];
        for (name, value) in lengths {
            if !is_positive(value) {
                return Err(ConfigError::InvalidDimension(name));
            }
        }
        if self.min_walls == 0 {
            return Err(ConfigError::InvalidDimension("min_walls"));
        }
        if texture::find(&self.default_texture).is_none() {
            return Err(ConfigError::UnknownTexture(self.default_texture.clone()));
        }
        Ok(())
    }
}

/// Rejects zero, negatives and NaN.
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("model input size must be non-zero")]
    InvalidInputSize,
    #[error("{0} must be within [0, 1]")]
    InvalidThreshold(&'static str),
    #[error("{0} must be positive")]
    InvalidDimension(&'static str),
    #[error("unknown texture: {0}")]
    UnknownTexture(String),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScannerConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub room: RoomConfig,
}

impl ScannerConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ScannerConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detection.validate()?;
        self.projection.validate()?;
        self.room.validate()
    }
}
