//! View rotation for the room preview.

use nalgebra::{Rotation3, Vector3};

/// Viewing angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Rotation about the X axis, applied first.
    pub pitch: f64,
    /// Rotation about the Y axis, applied second.
    pub yaw: f64,
}

impl Rotation {
    /// A rotation from pitch and yaw in degrees.
    pub fn new(pitch: f64, yaw: f64) -> Self {
        Self { pitch, yaw }
    }

    /// No rotation.
    pub fn identity() -> Self {
        Self::new(0.0, 0.0)
    }

    /// One auto-rotate tick; yaw wraps into `[0, 360)`.
    pub fn advance_yaw(&mut self, step: f64) {
        self.yaw = (self.yaw + step).rem_euclid(360.0);
    }

    /// Combined rotation: pitch about X, then yaw about Y.
    pub fn matrix(&self) -> Rotation3<f64> {
        let pitch = Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians());
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw.to_radians());
        yaw * pitch
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::new(20.0, 45.0)
    }
}
