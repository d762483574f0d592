//! Room assembly from captured walls.
//!
//! Walls are captured one at a time; once enough exist, they are combined
//! into a [`RoomModel`] that can be previewed and exported as JSON.

mod assembler;
mod model;
pub mod texture;

pub use assembler::RoomAssembler;
pub use model::{Dimensions, RoomModel, Wall};
pub use texture::{PatternType, Texture};

/// Room assembly errors.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("unknown texture: {0}")]
    UnknownTexture(String),
    #[error("no wall at position {0}")]
    WallNotFound(usize),
    #[error("no room model generated yet")]
    NoModel,
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
