//! Wall capture workflow.

use super::model::{Dimensions, RoomModel, Wall};
use super::texture;
use super::RoomError;
use crate::analysis::{SurfaceReport, SurfaceType};
use crate::config::RoomConfig;
use crate::detection::Element;
use chrono::Utc;

/// Collects walls and keeps the assembled room model.
///
/// Generated models hold their own copies of the walls, so later captures or
/// texture changes never alter a model that was already handed out.
#[derive(Debug)]
pub struct RoomAssembler {
    config: RoomConfig,
    walls: Vec<Wall>,
    model: Option<RoomModel>,
    selected_texture: String,
    last_wall_id: u64,
    regenerations: u64,
}

impl RoomAssembler {
    /// Creates an assembler. An unknown default texture falls back to
    /// [`texture::DEFAULT_TEXTURE_ID`].
    pub fn new(config: RoomConfig) -> Self {
        let selected_texture = if texture::find(&config.default_texture).is_some() {
            config.default_texture.clone()
        } else {
            texture::DEFAULT_TEXTURE_ID.to_string()
        };
        Self {
            config,
            walls: Vec::new(),
            model: None,
            selected_texture,
            last_wall_id: 0,
            regenerations: 0,
        }
    }

    /// Records a wall from the detected elements and the latest surface
    /// report, regenerating the room once enough walls exist.
    pub fn capture_wall(&mut self, elements: Vec<Element>, surface: Option<&SurfaceReport>) -> &Wall {
        let (surface_type, quality) =
            surface.map_or((SurfaceType::Wall, 0), |r| (r.surface_type, r.quality));

        let wall = Wall {
            id: self.next_wall_id(),
            elements,
            texture_id: self.selected_texture.clone(),
            dimensions: Dimensions {
                width: self.config.wall_width,
                height: self.config.wall_height,
            },
            position: self.walls.len(),
            surface_type,
            quality,
        };

        tracing::info!(
            id = wall.id,
            position = wall.position,
            elements = wall.elements.len(),
            surface = %wall.surface_type,
            quality = wall.quality,
            "Wall captured"
        );
        self.walls.push(wall);

        if self.walls.len() >= self.config.min_walls {
            self.regenerate();
        }

        let index = self.walls.len() - 1;
        &self.walls[index]
    }

    /// Selects the texture for future captures.
    pub fn select_texture(&mut self, id: &str) -> Result<(), RoomError> {
        if texture::find(id).is_none() {
            return Err(RoomError::UnknownTexture(id.to_string()));
        }
        self.selected_texture = id.to_string();
        Ok(())
    }

    /// Texture applied to the next captured wall.
    pub fn selected_texture(&self) -> &str {
        &self.selected_texture
    }

    /// Reassigns the texture of an already captured wall.
    ///
    /// The current room model is left as is until [`regenerate`](Self::regenerate).
    pub fn apply_texture(&mut self, position: usize, id: &str) -> Result<(), RoomError> {
        if texture::find(id).is_none() {
            return Err(RoomError::UnknownTexture(id.to_string()));
        }
        let wall = self
            .walls
            .get_mut(position)
            .ok_or(RoomError::WallNotFound(position))?;
        wall.texture_id = id.to_string();
        tracing::debug!(position, texture = id, "Texture applied");
        Ok(())
    }

    /// Rebuilds the room model from the current walls.
    pub fn regenerate(&mut self) -> &RoomModel {
        self.regenerations += 1;
        tracing::info!(walls = self.walls.len(), "Room model generated");
        self.model.insert(RoomModel {
            width: self.config.width,
            depth: self.config.depth,
            height: self.config.height,
            walls: self.walls.clone(),
            generated_at: Utc::now(),
        })
    }

    /// Clears all walls and the model.
    pub fn reset(&mut self) {
        self.walls.clear();
        self.model = None;
        tracing::info!("Scan reset");
    }

    /// Pretty JSON of the current room model.
    pub fn export_json(&self) -> Result<String, RoomError> {
        self.model.as_ref().ok_or(RoomError::NoModel)?.to_json()
    }

    /// Walls captured so far, in capture order.
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// The latest generated model, if enough walls were captured.
    pub fn model(&self) -> Option<&RoomModel> {
        self.model.as_ref()
    }

    /// How many times the model has been generated.
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    /// Millisecond timestamp, bumped past the previous id when captures
    /// land within the same millisecond.
    fn next_wall_id(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = now.max(self.last_wall_id + 1);
        self.last_wall_id = id;
        id
    }
}

impl Default for RoomAssembler {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
