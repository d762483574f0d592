//! Frame type representing a captured RGBA raster with metadata.

use image::{imageops::FilterType, RgbaImage};
use std::time::Instant;

/// Bytes per pixel in the RGBA layout used throughout the crate.
pub const CHANNELS: usize = 4;

/// A single captured frame from the capture boundary.
///
/// Pixels are stored row-major as interleaved RGBA samples. The sequence
/// number is used to discard stale detection results.
#[derive(Clone)]
pub struct Frame {
    /// Raw RGBA pixel data.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Capture timestamp for sampling cadence.
    timestamp: Instant,
    /// Monotonic sequence number.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Builds a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, sequence: u64, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self::new(pixels, width, height, sequence)
    }

    /// Builds a frame filled with a single color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4], sequence: u64) -> Self {
        Self::from_fn(width, height, sequence, |_, _| rgba)
    }

    /// Overrides the capture timestamp.
    pub fn with_timestamp(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns a reference to the raw RGBA data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// True when the frame has no pixels (capture buffer not ready).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count() * CHANNELS
    }

    /// Returns the RGBA sample at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = self.pixels.get(idx..idx + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Stretches the frame into an `side × side` raster.
    ///
    /// Returns `None` when the frame is empty or its buffer does not match
    /// its dimensions. The sequence number and timestamp are preserved.
    pub fn resized_square(&self, side: u32) -> Option<Frame> {
        if self.is_empty() || side == 0 || !self.is_valid() {
            return None;
        }
        if self.width == side && self.height == side {
            return Some(self.clone());
        }

        let source = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())?;
        let resized = image::imageops::resize(&source, side, side, FilterType::Triangle);

        Some(Frame {
            pixels: resized.into_raw(),
            width: side,
            height: side,
            timestamp: self.timestamp,
            sequence: self.sequence,
        })
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::solid(64, 48, [10, 20, 30, 255], 1);

        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
        assert_eq!(frame.pixel(3, 4), Some([10, 20, 30, 255]));
        assert_eq!(frame.pixel(64, 0), None);
    }

    #[test]
    fn test_frame_invalid_size() {
        let pixels = vec![0u8; 100]; // Wrong size
        let frame = Frame::new(pixels, 640, 480, 1);

        assert!(!frame.is_valid());
        assert!(frame.resized_square(32).is_none());
    }

    #[test]
    fn test_resize_to_square() {
        let frame = Frame::solid(40, 20, [200, 100, 50, 255], 7);
        let square = frame.resized_square(16).unwrap();

        assert_eq!(square.width(), 16);
        assert_eq!(square.height(), 16);
        assert_eq!(square.sequence(), 7);
        assert!(square.is_valid());
        assert_eq!(square.pixel(8, 8), Some([200, 100, 50, 255]));
    }

    #[test]
    fn test_empty_frame_not_resized() {
        let frame = Frame::new(Vec::new(), 0, 0, 1);
        assert!(frame.is_empty());
        assert!(frame.resized_square(16).is_none());
    }
}
