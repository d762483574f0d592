//! Capture boundary and frame handling.
//!
//! This module provides the RGBA frame type consumed by the scanner core
//! and a trait for anything that produces frames. Camera permissions,
//! device selection and torch control live outside the core.

mod frame;
mod source;

pub use frame::{Frame, CHANNELS};
pub use source::{CaptureError, FrameSource, SyntheticWall};
