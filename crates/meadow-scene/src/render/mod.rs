//! wgpu rendering of a [`Scene`](crate::scene::Scene).
//!
//! Each element gets its own pipeline built from separate vertex and fragment
//! WGSL modules. Bind group 0 carries the camera and key light, group 1 the
//! element's material (uniform block, texture, sampler). Material blocks are
//! refreshed from the element's `UniformSet` with `queue.write_buffer` every
//! frame; nothing is reallocated after an element is prepared.

pub mod programs;
mod scene_renderer;
mod uniforms;

pub use scene_renderer::SceneRenderer;
pub use uniforms::{CameraUniform, MaterialUniform};
