//! Static material catalog.

use serde::Serialize;

/// Fill used when a wall has no known texture.
pub const FALLBACK_COLOR: &str = "#f8f9fa";

/// Texture selected for new captures unless configured otherwise.
pub const DEFAULT_TEXTURE_ID: &str = "paint-white";

/// Surface pattern family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Solid,
    Brick,
    Wood,
    Pattern,
}

/// A catalog material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Texture {
    pub id: &'static str,
    pub name: &'static str,
    pub base_color: &'static str,
    pub pattern: PatternType,
    pub roughness: f32,
}

const fn texture(
    id: &'static str,
    name: &'static str,
    base_color: &'static str,
    pattern: PatternType,
    roughness: f32,
) -> Texture {
    Texture {
        id,
        name,
        base_color,
        pattern,
        roughness,
    }
}

/// Every material offered for preview.
pub static CATALOG: [Texture; 14] = [
    texture("paint-white", "Matte White", "#f8f9fa", PatternType::Solid, 0.8),
    texture("paint-beige", "Warm Beige", "#f5e6d3", PatternType::Solid, 0.8),
    texture("paint-gray", "Soft Gray", "#d1d5db", PatternType::Solid, 0.8),
    texture("paint-blue", "Sky Blue", "#bfdbfe", PatternType::Solid, 0.8),
    texture("paint-sage", "Sage Green", "#c2e0c6", PatternType::Solid, 0.8),
    texture("brick-red", "Red Brick", "#b91c1c", PatternType::Brick, 0.9),
    texture("brick-cream", "Cream Brick", "#d4a574", PatternType::Brick, 0.9),
    texture("wood-oak", "Light Oak", "#d97706", PatternType::Wood, 0.6),
    texture("wood-walnut", "Dark Walnut", "#78350f", PatternType::Wood, 0.6),
    texture("wallpaper-floral", "Floral", "#fce7f3", PatternType::Pattern, 0.7),
    texture("wallpaper-geometric", "Geometric", "#dbeafe", PatternType::Pattern, 0.7),
    texture("concrete", "Industrial Concrete", "#9ca3af", PatternType::Solid, 0.95),
    texture("stone", "Stone", "#a1a1a1", PatternType::Brick, 0.95),
    texture("marble", "Marble", "#f3f4f6", PatternType::Pattern, 0.3),
];

/// Looks up a texture by id.
pub fn find(id: &str) -> Option<&'static Texture> {
    CATALOG.iter().find(|t| t.id == id)
}

/// Base color of `id`, or [`FALLBACK_COLOR`] for unknown ids.
pub fn fill_color(id: &str) -> &'static str {
    find(id).map_or(FALLBACK_COLOR, |t| t.base_color)
}
