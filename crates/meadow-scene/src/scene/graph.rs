use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::geometry::{GeometryDescriptor, MeshData};

use super::{ElementKind, ShaderMaterial};

/// Geometry attached to a scene node.
#[derive(Debug, Clone)]
pub enum Mesh {
    /// Regular vertex + index buffers.
    Indexed(Rc<MeshData>),
    /// Index-only template drawn `instance_count` times; vertex positions are
    /// derived in the vertex shader.
    Instanced(Rc<GeometryDescriptor>),
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub kind: ElementKind,
    pub mesh: Mesh,
    pub material: ShaderMaterial,
    pub transform: Mat4,
}

impl SceneNode {
    pub fn new(kind: ElementKind, mesh: Mesh, material: ShaderMaterial) -> Self {
        Self {
            kind,
            mesh,
            material,
            transform: Mat4::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }
}

/// Directional light shining from `position` towards the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Vec3, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            position,
        }
    }

    /// Unit vector pointing from the surface towards the light.
    pub fn to_light(&self) -> Vec3 {
        let dir = self.position.normalize_or_zero();
        if dir == Vec3::ZERO { Vec3::Y } else { dir }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::ONE, 1.0, Vec3::new(1.0, 1.0, 1.0))
    }
}

/// Append-only scene graph.
///
/// Nodes are never removed, so renderers can track what they already prepared
/// by index.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    lights: Vec<DirectionalLight>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    pub fn add_light(&mut self, light: DirectionalLight) {
        self.lights.push(light);
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn lights(&self) -> &[DirectionalLight] {
        &self.lights
    }

    /// First light, or a default white one if none was added.
    pub fn key_light(&self) -> DirectionalLight {
        self.lights.first().copied().unwrap_or_default()
    }

    pub fn contains(&self, kind: ElementKind) -> bool {
        self.nodes.iter().any(|n| n.kind == kind)
    }

    pub fn node(&self, kind: ElementKind) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
