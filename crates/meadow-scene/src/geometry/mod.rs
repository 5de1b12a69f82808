//! CPU-side geometry.
//!
//! - `blade`: the index-only template shared by every grass instance
//! - `mesh`: indexed position/uv meshes for the sky dome and the ground plane

pub mod blade;
mod mesh;

pub use blade::GeometryDescriptor;
pub use mesh::{MeshData, MeshVertex};
