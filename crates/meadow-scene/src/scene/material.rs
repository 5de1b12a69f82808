use std::rc::Rc;

use crate::uniforms::UniformSet;

/// WGSL sources of one shader program. Each stage lives in its own module; entry
/// points are `vs_main` and `fs_main`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    pub label: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
}

/// Which faces a material draws.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    /// Inside of closed meshes (sky dome).
    Back,
    Double,
}

impl Side {
    /// Faces culled by the pipeline (counter-clockwise front faces).
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

/// A shader program bound to the uniform set it owns.
#[derive(Debug, Clone)]
pub struct ShaderMaterial {
    program: ShaderProgram,
    uniforms: Rc<UniformSet>,
    side: Side,
}

impl ShaderMaterial {
    pub fn new(program: ShaderProgram, uniforms: UniformSet) -> Self {
        Self {
            program,
            uniforms: Rc::new(uniforms),
            side: Side::default(),
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    /// Shared handle; the registry keeps a weak reference to the same set.
    pub fn uniforms(&self) -> &Rc<UniformSet> {
        &self.uniforms
    }

    pub fn side(&self) -> Side {
        self.side
    }
}
