//! Perspective projection of the room box into drawable faces.

use super::Rotation;
use crate::config::ProjectionConfig;
use crate::detection::ElementType;
use crate::room::{texture, RoomModel};
use nalgebra::{Point3, Rotation3};
use std::fmt;

const FLOOR_COLOR: &str = "#94a3b8";
const CEILING_COLOR: &str = "#e2e8f0";
const WALL_OPACITY: f64 = 0.9;
const SURFACE_OPACITY: f64 = 0.6;

/// One side of the room box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKind {
    Front,
    Right,
    Back,
    Left,
    Floor,
    Ceiling,
}

impl FaceKind {
    pub const ALL: [FaceKind; 6] = [
        FaceKind::Front,
        FaceKind::Right,
        FaceKind::Back,
        FaceKind::Left,
        FaceKind::Floor,
        FaceKind::Ceiling,
    ];

    /// Wall capture position shown on this face.
    pub fn wall_position(self) -> Option<usize> {
        match self {
            FaceKind::Front => Some(0),
            FaceKind::Right => Some(1),
            FaceKind::Back => Some(2),
            FaceKind::Left => Some(3),
            FaceKind::Floor | FaceKind::Ceiling => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaceKind::Front => "front",
            FaceKind::Right => "right",
            FaceKind::Back => "back",
            FaceKind::Left => "left",
            FaceKind::Floor => "floor",
            FaceKind::Ceiling => "ceiling",
        }
    }

    /// Corners of this face on a box of the given size centred on the origin.
    fn corners(self, width: f64, depth: f64, height: f64) -> [Point3<f64>; 4] {
        let (w, d, h) = (width / 2.0, depth / 2.0, height / 2.0);
        let p = Point3::new;
        match self {
            FaceKind::Front => [p(-w, -h, d), p(w, -h, d), p(w, h, d), p(-w, h, d)],
            FaceKind::Right => [p(w, -h, d), p(w, -h, -d), p(w, h, -d), p(w, h, d)],
            FaceKind::Back => [p(w, -h, -d), p(-w, -h, -d), p(-w, h, -d), p(w, h, -d)],
            FaceKind::Left => [p(-w, -h, -d), p(-w, -h, d), p(-w, h, d), p(-w, h, -d)],
            FaceKind::Floor => [p(-w, -h, d), p(w, -h, d), p(w, -h, -d), p(-w, -h, -d)],
            FaceKind::Ceiling => [p(-w, h, d), p(w, h, d), p(w, h, -d), p(-w, h, -d)],
        }
    }
}

impl fmt::Display for FaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen position; `z` is the rotated depth before perspective.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A detected element placed on a projected face.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementMarker {
    pub element_id: u32,
    pub kind: ElementType,
    pub x: f64,
    pub y: f64,
    pub color: String,
}

/// A face ready to paint, in back-to-front order.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableFace {
    pub face: FaceKind,
    pub points: [ProjectedPoint; 4],
    /// Mean rotated depth of the corners.
    pub depth: f64,
    pub fill: &'static str,
    pub opacity: f64,
    pub markers: Vec<ElementMarker>,
}

/// Projects a room model into 2D for a painter's-algorithm preview.
#[derive(Debug, Clone, Copy)]
pub struct SceneProjector {
    focal_distance: f64,
    scale: f64,
}

impl SceneProjector {
    /// A projector with the given viewer distance and pixels per meter.
    pub fn new(focal_distance: f64, scale: f64) -> Self {
        Self {
            focal_distance,
            scale,
        }
    }

    /// Builds a projector from the `[projection]` config section.
    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self::new(config.focal_distance, config.scale)
    }

    /// Projects one point through an already composed rotation.
    pub fn project_point(&self, rotation: &Rotation3<f64>, point: Point3<f64>) -> ProjectedPoint {
        let rotated = rotation * point;
        let perspective = self.focal_distance / (self.focal_distance + rotated.z);
        ProjectedPoint {
            x: rotated.x * self.scale * perspective,
            y: rotated.y * self.scale * perspective,
            z: rotated.z,
        }
    }

    /// Returns the six faces sorted by ascending depth.
    ///
    /// Faces with equal depth keep their front/right/back/left/floor/ceiling
    /// order.
    pub fn project(&self, model: &RoomModel, rotation: Rotation) -> Vec<DrawableFace> {
        let matrix = rotation.matrix();

        let mut faces: Vec<DrawableFace> = FaceKind::ALL
            .iter()
            .map(|&face| {
                let points = face
                    .corners(model.width, model.depth, model.height)
                    .map(|corner| self.project_point(&matrix, corner));
                let depth = points.iter().map(|p| p.z).sum::<f64>() / points.len() as f64;
                let wall = face.wall_position().and_then(|i| model.wall_at(i));

                let (fill, opacity) = match face {
                    FaceKind::Floor => (FLOOR_COLOR, SURFACE_OPACITY),
                    FaceKind::Ceiling => (CEILING_COLOR, SURFACE_OPACITY),
                    _ => (
                        wall.map_or(texture::FALLBACK_COLOR, |w| texture::fill_color(&w.texture_id)),
                        WALL_OPACITY,
                    ),
                };

                let markers = wall
                    .map(|w| {
                        w.elements
                            .iter()
                            .map(|el| ElementMarker {
                                element_id: el.id,
                                kind: el.kind,
                                x: lerp(points[0].x, points[1].x, el.x as f64),
                                y: lerp(points[0].y, points[2].y, el.y as f64),
                                color: el.color.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                DrawableFace {
                    face,
                    points,
                    depth,
                    fill,
                    opacity,
                    markers,
                }
            })
            .collect();

        faces.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        tracing::trace!(pitch = rotation.pitch, yaw = rotation.yaw, "Scene projected");
        faces
    }
}

impl Default for SceneProjector {
    fn default() -> Self {
        Self::from_config(&ProjectionConfig::default())
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
