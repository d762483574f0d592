//! Frame source abstraction for the capture boundary.
//!
//! The scanner core only consumes readable RGBA rasters. Device selection,
//! permissions and torch control stay with whatever implements
//! [`FrameSource`]; the synthetic source here exists for demos and tests.

use super::Frame;
use thiserror::Error;

/// Errors that can occur while pulling frames.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("frame source not opened")]
    NotOpened,
}

/// Trait for frame producers.
pub trait FrameSource {
    /// Prepares the source for capture.
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Pulls a single frame.
    fn next_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Checks if the source is currently open.
    fn is_open(&self) -> bool;

    /// Stops the source and releases resources.
    fn close(&mut self);
}

/// Synthetic painted wall: a flat base color with optional vertical stripes.
///
/// Stripes produce strong horizontal gradients, which lets callers drive
/// the surface analyzer through every classification.
#[derive(Debug, Clone)]
pub struct SyntheticWall {
    width: u32,
    height: u32,
    base: [u8; 3],
    stripe_period: Option<u32>,
    opened: bool,
    sequence: u64,
}

impl SyntheticWall {
    /// A closed source painting `width`x`height` frames in `base`.
    pub fn new(width: u32, height: u32, base: [u8; 3]) -> Self {
        Self {
            width,
            height,
            base,
            stripe_period: None,
            opened: false,
            sequence: 0,
        }
    }

    /// Adds a dark stripe every `period` columns.
    pub fn with_stripes(mut self, period: u32) -> Self {
        self.stripe_period = Some(period.max(2));
        self
    }
}

impl FrameSource for SyntheticWall {
    fn open(&mut self) -> Result<(), CaptureError> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        self.opened = true;
        self.sequence = 0;
        tracing::info!(
            width = self.width,
            height = self.height,
            "Synthetic frame source opened"
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        if !self.opened {
            return Err(CaptureError::NotOpened);
        }

        let [r, g, b] = self.base;
        let stripe = self.stripe_period;
        self.sequence += 1;

        Ok(Frame::from_fn(self.width, self.height, self.sequence, |x, _| {
            match stripe {
                Some(period) if x % period == 0 => [r / 4, g / 4, b / 4, 255],
                _ => [r, g, b, 255],
            }
        }))
    }

    fn is_open(&self) -> bool {
        self.opened
    }

    fn close(&mut self) {
        self.opened = false;
        tracing::info!("Synthetic frame source closed");
    }
}
