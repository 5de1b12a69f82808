//! Viewport geometry shared by the runtime and the scene layer.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware) for sizes
//! - Device pixels = logical pixels × pixel ratio, for framebuffers and shaders

mod viewport;

pub use viewport::{clamp_pixel_ratio, ViewportState, DEFAULT_MAX_PIXEL_RATIO};
