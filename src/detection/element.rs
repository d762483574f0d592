//! Semantic wall fixtures produced by the decoder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known fixture classes, in model class-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Outlet,
    Switch,
    Window,
    Door,
}

impl ElementType {
    /// All classes, indexed by model class id.
    pub const ALL: [ElementType; 4] = [
        ElementType::Outlet,
        ElementType::Switch,
        ElementType::Window,
        ElementType::Door,
    ];

    /// Maps a model class index. Unknown indices yield `None`.
    pub fn from_class_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Marker color used by the renderer.
    pub fn color(self) -> &'static str {
        match self {
            ElementType::Outlet => "#ef4444",
            ElementType::Switch => "#f59e0b",
            ElementType::Window => "#3b82f6",
            ElementType::Door => "#8b5cf6",
        }
    }

    /// Signed offset from the wall plane: windows recess, the rest protrude.
    pub fn depth_offset(self) -> f32 {
        match self {
            ElementType::Window => -0.1,
            _ => 0.05,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Outlet => "outlet",
            ElementType::Switch => "switch",
            ElementType::Window => "window",
            ElementType::Door => "door",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected fixture in surface-relative coordinates.
///
/// `x`, `y`, `width` and `height` are fractions of the captured surface,
/// with `(x, y)` the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    pub depth_offset: f32,
    pub color: String,
}
