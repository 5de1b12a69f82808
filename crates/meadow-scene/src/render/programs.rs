//! Shader programs of the three elements.

use crate::scene::ShaderProgram;

pub const SKY: ShaderProgram = ShaderProgram {
    label: "sky",
    vertex: include_str!("shaders/sky.vert.wgsl"),
    fragment: include_str!("shaders/sky.frag.wgsl"),
};

pub const GROUND: ShaderProgram = ShaderProgram {
    label: "ground",
    vertex: include_str!("shaders/ground.vert.wgsl"),
    fragment: include_str!("shaders/ground.frag.wgsl"),
};

pub const GRASS: ShaderProgram = ShaderProgram {
    label: "grass",
    vertex: include_str!("shaders/grass.vert.wgsl"),
    fragment: include_str!("shaders/grass.frag.wgsl"),
};

/// Vertex stage entry point of every program.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment stage entry point of every program.
pub const FRAGMENT_ENTRY: &str = "fs_main";
