//! Meadow engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the scene layer:
//! window and event loop, wgpu device/surface, frame timing and logging.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
