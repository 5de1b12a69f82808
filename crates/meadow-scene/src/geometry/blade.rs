//! Grass blade template.
//!
//! A blade is a strip of `segment_count` quads drawn twice: once front-facing and
//! once back-facing with the opposite winding, so it stays lit from both sides
//! without toggling culling per draw. The template carries indices only; the
//! grass vertex shader derives positions from the vertex index and the
//! instance index.
//!
//! Vertex slots `[0, vertex_count)` belong to the front face,
//! `[vertex_count, 2 * vertex_count)` to the back face.

use crate::config::FieldConfig;
use crate::error::ConfigurationError;

/// Indices emitted per segment: two triangles per face, two faces.
pub const INDICES_PER_SEGMENT: usize = 12;

/// Upper bound on blade segments. Keeps the index buffer small enough to
/// allocate and well inside 32-bit index range.
pub const MAX_SEGMENT_COUNT: i64 = 1 << 16;

/// Immutable instanced-mesh template for one grass field.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDescriptor {
    segment_count: u32,
    vertex_count: u32,
    indices: Vec<u32>,
    instance_count: u32,
    bounding_radius: f32,
}

impl GeometryDescriptor {
    /// Builds the template for a field configuration.
    pub fn from_field(field: &FieldConfig) -> Result<Self, ConfigurationError> {
        build(field.segment_count, field.instance_count, field.patch_size)
    }

    pub fn segment_count(&self) -> u32 {
        self.segment_count
    }

    /// Vertices per face: `(segment_count + 1) * 2`.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Vertex slots addressed by the index sequence (both faces).
    pub fn vertex_slots(&self) -> u32 {
        self.vertex_count * 2
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Radius of the bounding sphere centered at the field origin.
    ///
    /// This is the hand-picked bound `1 + 2 * patch_size`, not one computed from
    /// instance placement (placement happens in the shader). It is meant to be
    /// loose enough that the field is never culled while any part is visible;
    /// do not treat it as tight.
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }
}

/// Builds the blade index topology and bounding volume.
///
/// For segment `i`, with `vi = 2i` and `fi = vertex_count + vi`:
///
/// ```text
/// front: vi+0 vi+1 vi+2   vi+2 vi+1 vi+3
/// back:  fi+2 fi+1 fi+0   fi+3 fi+1 fi+2
/// ```
///
/// Fails with [`ConfigurationError`] before emitting anything when
/// `segment_count < 1`, `instance_count == 0` or `patch_size` is not a finite
/// positive number.
pub fn build(
    segment_count: i64,
    instance_count: u32,
    patch_size: f32,
) -> Result<GeometryDescriptor, ConfigurationError> {
    if segment_count < 1 {
        return Err(ConfigurationError::SegmentCount(segment_count));
    }
    if segment_count > MAX_SEGMENT_COUNT {
        return Err(ConfigurationError::TooManySegments(segment_count));
    }
    if instance_count == 0 {
        return Err(ConfigurationError::InstanceCount);
    }
    if !(patch_size.is_finite() && patch_size > 0.0) {
        return Err(ConfigurationError::PatchSize(patch_size));
    }

    let segments = segment_count as u32;
    let vertex_count = (segments + 1) * 2;

    let mut indices = Vec::with_capacity(segments as usize * INDICES_PER_SEGMENT);
    for i in 0..segments {
        let vi = i * 2;
        indices.extend_from_slice(&[vi, vi + 1, vi + 2, vi + 2, vi + 1, vi + 3]);

        let fi = vertex_count + vi;
        indices.extend_from_slice(&[fi + 2, fi + 1, fi, fi + 3, fi + 1, fi + 2]);
    }

    Ok(GeometryDescriptor {
        segment_count: segments,
        vertex_count,
        indices,
        instance_count,
        bounding_radius: 1.0 + patch_size * 2.0,
    })
}
