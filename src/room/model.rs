//! Serializable wall and room records.
//!
//! The JSON form of [`RoomModel`] is the scanner's only durable artifact.

use super::RoomError;
use crate::analysis::SurfaceType;
use crate::detection::Element;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Physical size of a captured surface, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// One captured surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wall {
    pub id: u64,
    pub elements: Vec<Element>,
    #[serde(rename = "texture")]
    pub texture_id: String,
    pub dimensions: Dimensions,
    /// Capture order; 0 = front, 1 = right, 2 = back, 3 = left.
    pub position: usize,
    pub surface_type: SurfaceType,
    pub quality: u8,
}

/// Snapshot of the room assembled from captured walls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomModel {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub walls: Vec<Wall>,
    pub generated_at: DateTime<Utc>,
}

impl RoomModel {
    /// Wall at a capture position, if captured.
    pub fn wall_at(&self, position: usize) -> Option<&Wall> {
        self.walls.get(position)
    }

    /// Total number of detected elements across all walls.
    pub fn element_count(&self) -> usize {
        self.walls.iter().map(|w| w.elements.len()).sum()
    }

    /// Pretty-printed JSON export.
    pub fn to_json(&self) -> Result<String, RoomError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses an exported model.
    pub fn from_json(json: &str) -> Result<Self, RoomError> {
        Ok(serde_json::from_str(json)?)
    }
}
