//! Heuristic surface statistics for captured frames.
//!
//! These are cheap heuristics meant for live feedback, not a material
//! classifier. Edge density is the main signal: plain painted walls have
//! few strong gradients, cluttered scenes have many.

use crate::capture::{Frame, CHANNELS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default gradient magnitude above which a pixel counts as an edge.
pub const DEFAULT_EDGE_THRESHOLD: u16 = 50;

/// Coarse surface classification from edge density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceType {
    SmoothWall,
    #[default]
    Wall,
    TexturedSurface,
    ComplexScene,
}

impl SurfaceType {
    /// Classifies an edge density; the first matching rule wins.
    pub fn classify(edge_density: f64) -> Self {
        if edge_density < 0.10 {
            SurfaceType::SmoothWall
        } else if edge_density > 0.25 {
            SurfaceType::ComplexScene
        } else if edge_density > 0.15 {
            SurfaceType::TexturedSurface
        } else {
            SurfaceType::Wall
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SurfaceType::SmoothWall => "smooth-wall",
            SurfaceType::Wall => "wall",
            SurfaceType::TexturedSurface => "textured-surface",
            SurfaceType::ComplexScene => "complex-scene",
        }
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mean value of each color channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelMeans {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Result of analyzing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceReport {
    /// Mean of `(R + G + B) / 3` over all pixels, 0–255.
    pub brightness: f64,
    pub color: ChannelMeans,
    /// Fraction of interior pixels that are edges, 0–1.
    pub edge_density: f64,
    pub surface_type: SurfaceType,
    /// 0–100; rewards low clutter and adequate lighting.
    pub quality: u8,
}

/// Quality score from edge density and brightness.
pub fn quality_score(edge_density: f64, brightness: f64) -> u8 {
    let raw = (1.0 - edge_density) * 0.8 + (brightness / 255.0) * 0.2;
    (raw.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Computes brightness, color means and edge density of a frame.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceAnalyzer {
    edge_threshold: u16,
}

impl SurfaceAnalyzer {
    /// An analyzer with the default edge threshold.
    pub fn new() -> Self {
        Self {
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
        }
    }

    /// An analyzer counting gradients above `edge_threshold` as edges.
    pub fn with_edge_threshold(edge_threshold: u16) -> Self {
        Self { edge_threshold }
    }

    /// Analyzes the frame.
    ///
    /// Returns `None` when the capture buffer is not ready (zero size or a
    /// buffer that does not match the dimensions).
    pub fn analyze(&self, frame: &Frame) -> Option<SurfaceReport> {
        if frame.is_empty() || !frame.is_valid() {
            return None;
        }

        let pixels = frame.pixels();
        let n = frame.pixel_count() as f64;

        let (mut sum_r, mut sum_g, mut sum_b) = (0u64, 0u64, 0u64);
        for px in pixels.chunks_exact(CHANNELS) {
            sum_r += px[0] as u64;
            sum_g += px[1] as u64;
            sum_b += px[2] as u64;
        }
        let color = ChannelMeans {
            r: sum_r as f64 / n,
            g: sum_g as f64 / n,
            b: sum_b as f64 / n,
        };
        let brightness = (color.r + color.g + color.b) / 3.0;

        let edge_density = self.edge_density(frame);
        let surface_type = SurfaceType::classify(edge_density);
        let quality = quality_score(edge_density, brightness);

        tracing::trace!(
            sequence = frame.sequence(),
            brightness,
            edge_density,
            %surface_type,
            quality,
            "Surface analyzed"
        );

        Some(SurfaceReport {
            brightness,
            color,
            edge_density,
            surface_type,
            quality,
        })
    }

    /// Fraction of interior pixels whose red-channel gradient
    /// `|I(x,y) - I(x+1,y)| + |I(x,y+1) - I(x,y)|` exceeds the threshold.
    fn edge_density(&self, frame: &Frame) -> f64 {
        let (w, h) = (frame.width() as usize, frame.height() as usize);
        if w < 3 || h < 3 {
            return 0.0;
        }

        let pixels = frame.pixels();
        let red = |x: usize, y: usize| pixels[(y * w + x) * CHANNELS] as i16;

        let mut edges = 0usize;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let here = red(x, y);
                let gradient = here.abs_diff(red(x + 1, y)) + red(x, y + 1).abs_diff(here);
                if gradient > self.edge_threshold {
                    edges += 1;
                }
            }
        }

        let interior = (w - 2) * (h - 2);
        edges as f64 / interior as f64
    }
}

impl Default for SurfaceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn checkerboard(size: u32) -> Frame {
        Frame::from_fn(size, size, 1, |x, y| {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            [v, v, v, 255]
        })
    }

    #[test]
    fn test_classification_examples() {
        assert_eq!(SurfaceType::classify(0.05), SurfaceType::SmoothWall);
        assert_eq!(SurfaceType::classify(0.12), SurfaceType::Wall);
        assert_eq!(SurfaceType::classify(0.18), SurfaceType::TexturedSurface);
        assert_eq!(SurfaceType::classify(0.20), SurfaceType::TexturedSurface);
        assert_eq!(SurfaceType::classify(0.30), SurfaceType::ComplexScene);
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(SurfaceType::classify(0.10), SurfaceType::Wall);
        assert_eq!(SurfaceType::classify(0.15), SurfaceType::Wall);
        assert_eq!(SurfaceType::classify(0.25), SurfaceType::TexturedSurface);
    }

    #[test]
    fn test_uniform_frame_is_smooth() {
        let frame = Frame::solid(16, 16, [128, 128, 128, 255], 1);
        let report = SurfaceAnalyzer::new().analyze(&frame).unwrap();

        assert_eq!(report.edge_density, 0.0);
        assert_eq!(report.surface_type, SurfaceType::SmoothWall);
        assert_relative_eq!(report.brightness, 128.0);
        // 0.8 + 0.2 * 128 / 255 = 0.9004
        assert_eq!(report.quality, 90);
    }

    #[test]
    fn test_color_means() {
        let frame = Frame::from_fn(2, 1, 1, |x, _| if x == 0 { [10, 20, 30, 0] } else { [30, 40, 50, 0] });
        let report = SurfaceAnalyzer::new().analyze(&frame).unwrap();

        assert_relative_eq!(report.color.r, 20.0);
        assert_relative_eq!(report.color.g, 30.0);
        assert_relative_eq!(report.color.b, 40.0);
        assert_relative_eq!(report.brightness, 30.0);
    }

    #[test]
    fn test_checkerboard_is_complex() {
        let report = SurfaceAnalyzer::new().analyze(&checkerboard(8)).unwrap();

        assert_eq!(report.edge_density, 1.0);
        assert_eq!(report.surface_type, SurfaceType::ComplexScene);
        // Only the lighting term remains: 0.2 * 127.5 / 255
        assert_eq!(report.quality, 10);
    }

    #[test]
    fn test_only_red_channel_drives_edges() {
        let frame = Frame::from_fn(8, 8, 1, |x, y| {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            [100, v, v, 255]
        });
        let report = SurfaceAnalyzer::new().analyze(&frame).unwrap();
        assert_eq!(report.edge_density, 0.0);
    }

    #[test]
    fn test_border_excluded() {
        // A bright right-most column only touches border pixels' neighbors
        // from the last interior column.
        let frame = Frame::from_fn(5, 5, 1, |x, _| if x == 4 { [255, 0, 0, 255] } else { [0, 0, 0, 255] });
        let report = SurfaceAnalyzer::new().analyze(&frame).unwrap();

        // Interior is 3x3; column x = 3 sees the jump to x = 4.
        assert_relative_eq!(report.edge_density, 3.0 / 9.0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let frame = Frame::from_fn(4, 4, 1, |x, _| [(x * 50) as u8, 0, 0, 255]);

        // Horizontal step of exactly 50
        let strict = SurfaceAnalyzer::new().analyze(&frame).unwrap();
        assert_eq!(strict.edge_density, 0.0);

        let loose = SurfaceAnalyzer::with_edge_threshold(49).analyze(&frame).unwrap();
        assert_eq!(loose.edge_density, 1.0);
    }

    #[test]
    fn test_unavailable_frames() {
        let analyzer = SurfaceAnalyzer::new();
        assert!(analyzer.analyze(&Frame::new(Vec::new(), 0, 0, 1)).is_none());
        assert!(analyzer.analyze(&Frame::new(vec![0; 3], 2, 2, 1)).is_none());
    }

    #[test]
    fn test_tiny_frame_has_no_interior() {
        let report = SurfaceAnalyzer::new().analyze(&checkerboard(2)).unwrap();
        assert_eq!(report.edge_density, 0.0);
    }

    #[test]
    fn test_quality_clamped() {
        assert_eq!(quality_score(0.0, 255.0), 100);
        assert_eq!(quality_score(1.0, 0.0), 0);
        assert_eq!(quality_score(1.5, 0.0), 0);
    }
}
