//! Frame to inference-input encoding.
//!
//! Converts an `N × N` RGBA frame into a `[1, 3, N, N]` tensor of
//! channel-planar R, G, B values normalized to `[0, 1]`. Resizing is the
//! caller's job (see [`Frame::resized_square`]).

mod tensor;

pub use tensor::{ShapeError, Tensor};

use crate::capture::{Frame, CHANNELS};
use thiserror::Error;

/// Default model input side length.
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// Errors raised when a frame cannot be encoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("frame has no pixels")]
    EmptyFrame,
    #[error("frame is {width}x{height}, encoder expects {expected}x{expected}")]
    SizeMismatch { expected: u32, width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, dimensions need {expected}")]
    BufferMismatch { expected: usize, actual: usize },
}

/// Encodes square RGBA frames into normalized NCHW tensors.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    input_size: u32,
}

impl FrameEncoder {
    /// An encoder for square frames of side `input_size`.
    pub fn new(input_size: u32) -> Self {
        Self { input_size }
    }

    /// Side length of the encoded raster.
    #[inline]
    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Encodes the frame. Alpha is dropped; each sample becomes `v / 255`.
    pub fn encode(&self, frame: &Frame) -> Result<Tensor, EncodeError> {
        if frame.is_empty() {
            return Err(EncodeError::EmptyFrame);
        }
        if frame.width() != self.input_size || frame.height() != self.input_size {
            return Err(EncodeError::SizeMismatch {
                expected: self.input_size,
                width: frame.width(),
                height: frame.height(),
            });
        }
        if !frame.is_valid() {
            return Err(EncodeError::BufferMismatch {
                expected: frame.pixel_count() * CHANNELS,
                actual: frame.pixels().len(),
            });
        }

        let side = self.input_size as usize;
        let plane = side * side;
        let mut data = vec![0.0f32; plane * 3];

        for (i, px) in frame.pixels().chunks_exact(CHANNELS).enumerate() {
            data[i] = px[0] as f32 / 255.0;
            data[plane + i] = px[1] as f32 / 255.0;
            data[2 * plane + i] = px[2] as f32 / 255.0;
        }

        let tensor = Tensor::new(data, vec![1, 3, side, side]).map_err(|e| {
            EncodeError::BufferMismatch {
                expected: e.expected,
                actual: e.actual,
            }
        })?;

        tracing::trace!(side, sequence = frame.sequence(), "Encoded frame");
        Ok(tensor)
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}
