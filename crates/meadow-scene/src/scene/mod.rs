//! Scene graph and the assembly of its three visual elements.

mod assembler;
mod graph;
mod material;

use std::fmt;

pub use assembler::{install, AssemblyReport, ElementFuture, PendingElements, SceneAssembler};
pub use graph::{DirectionalLight, Mesh, Scene, SceneNode};
pub use material::{ShaderMaterial, ShaderProgram, Side};

/// The visual elements making up the meadow.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ElementKind {
    Sky,
    Ground,
    Grass,
}

impl ElementKind {
    /// Construction order used by [`SceneAssembler::assemble`].
    pub const ALL: [ElementKind; 3] = [ElementKind::Sky, ElementKind::Ground, ElementKind::Grass];

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Sky => "sky",
            ElementKind::Ground => "ground",
            ElementKind::Grass => "grass",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
