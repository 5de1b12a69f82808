use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};

/// Vertex layout shared by the sky and ground meshes (20 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle mesh, counter-clockwise front faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// UV sphere centered at the origin.
    ///
    /// Segments are clamped to the minimum that still encloses a volume
    /// (3 around, 2 from pole to pole). Pole rows emit one triangle per quad.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let row = ws + 1;

        let mut vertices = Vec::with_capacity((row * (hs + 1)) as usize);
        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            let theta = v * PI;
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let phi = u * 2.0 * PI;
                vertices.push(MeshVertex {
                    position: [
                        -radius * phi.cos() * theta.sin(),
                        radius * theta.cos(),
                        radius * phi.sin() * theta.sin(),
                    ],
                    uv: [u, 1.0 - v],
                });
            }
        }

        let mut indices = Vec::with_capacity((ws * (hs - 1) * 6) as usize);
        for iy in 0..hs {
            for ix in 0..ws {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;

                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    /// Subdivided `width × height` plane in the XY plane, facing +Z.
    pub fn plane(width: f32, height: f32, x_segments: u32, y_segments: u32) -> Self {
        let gx = x_segments.max(1);
        let gy = y_segments.max(1);
        let row = gx + 1;
        let (half_w, half_h) = (width / 2.0, height / 2.0);
        let (seg_w, seg_h) = (width / gx as f32, height / gy as f32);

        let mut vertices = Vec::with_capacity((row * (gy + 1)) as usize);
        for iy in 0..=gy {
            let y = iy as f32 * seg_h - half_h;
            for ix in 0..=gx {
                let x = ix as f32 * seg_w - half_w;
                vertices.push(MeshVertex {
                    position: [x, -y, 0.0],
                    uv: [ix as f32 / gx as f32, 1.0 - iy as f32 / gy as f32],
                });
            }
        }

        let mut indices = Vec::with_capacity((gx * gy * 6) as usize);
        for iy in 0..gy {
            for ix in 0..gx {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = ix + 1 + row * (iy + 1);
                let d = ix + 1 + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(p: [f32; 3]) -> f32 {
        (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
    }

    // ── sphere ────────────────────────────────────────────────────────────

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let m = MeshData::sphere(5000.0, 32, 15);
        assert_eq!(m.vertices.len(), 33 * 16);
        for v in &m.vertices {
            assert!((length(v.position) - 5000.0).abs() < 0.5);
        }
    }

    #[test]
    fn sphere_skips_degenerate_pole_triangles() {
        let m = MeshData::sphere(1.0, 32, 15);
        // 2 triangles per quad, minus one per quad on each pole row.
        assert_eq!(m.triangle_count(), 32 * 15 * 2 - 2 * 32);
        let n = m.vertices.len() as u32;
        assert!(m.indices.iter().all(|&i| i < n));
    }

    // ── plane ─────────────────────────────────────────────────────────────

    #[test]
    fn plane_grid_counts() {
        let m = MeshData::plane(1.0, 1.0, 512, 512);
        assert_eq!(m.vertices.len(), 513 * 513);
        assert_eq!(m.triangle_count(), 512 * 512 * 2);
    }

    #[test]
    fn plane_spans_unit_square_and_faces_z() {
        let m = MeshData::plane(1.0, 1.0, 2, 2);
        let xs: Vec<f32> = m.vertices.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs.iter().copied().fold(f32::INFINITY, f32::min), -0.5);
        assert_eq!(xs.iter().copied().fold(f32::NEG_INFINITY, f32::max), 0.5);
        assert!(m.vertices.iter().all(|v| v.position[2] == 0.0));

        // First triangle is counter-clockwise seen from +Z.
        let p = |i: u32| m.vertices[i as usize].position;
        let (a, b, c) = (p(m.indices[0]), p(m.indices[1]), p(m.indices[2]));
        let cross_z = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        assert!(cross_z > 0.0);
    }
}
