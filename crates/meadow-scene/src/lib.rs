//! Meadow scene crate.
//!
//! Builds an instanced grass field with a sky dome and a ground plane on top of
//! `meadow-engine`:
//! - `geometry`: the blade index template and regular meshes
//! - `uniforms`: per-program parameter sets and the registry that keeps their
//!   `time` / `resolution` in sync
//! - `resize` and `frame`: the viewport-change path and the per-frame loop
//! - `scene`: scene graph and element assembly
//! - `render`: wgpu renderer for the scene graph
//! - `app`: the [`Experience`] application

pub mod assets;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod render;
pub mod resize;
pub mod scene;
pub mod uniforms;

mod app;

pub use app::Experience;
pub use config::{CameraConfig, ExperienceConfig, FieldConfig, SceneConfig};
pub use error::{ConfigurationError, ResourceLoadError, SceneError, TickError};
