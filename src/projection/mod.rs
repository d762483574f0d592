//! 3D room preview.
//!
//! The room is drawn as a box of six flat faces with a painter's algorithm:
//! faces are sorted by mean depth and painted back to front. That is only
//! correct for a convex box, which is all the preview needs.

mod projector;
mod rotation;

pub use projector::{DrawableFace, ElementMarker, FaceKind, ProjectedPoint, SceneProjector};
pub use rotation::Rotation;
