use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::camera::PerspectiveCamera;
use crate::scene::DirectionalLight;
use crate::uniforms::{UniformSet, UniformValue};

/// Bind group 0, binding 0. Mirrors `struct Camera` in the WGSL sources.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
    /// xyz: unit vector towards the light, w: intensity.
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
}

impl CameraUniform {
    pub fn new(camera: &PerspectiveCamera, light: &DirectionalLight) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: camera.position.extend(1.0).to_array(),
            light_dir: light.to_light().extend(light.intensity).to_array(),
            light_color: light.color.extend(1.0).to_array(),
        }
    }
}

/// Bind group 1, binding 0. Mirrors `struct Material` in the WGSL sources.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub model: [[f32; 4]; 4],
    pub params: [f32; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub _pad: f32,
}

impl MaterialUniform {
    /// Snapshot of `set`. `params_name` selects the vec4 parameter forwarded as
    /// `params`; missing values are zero.
    pub fn from_set(set: &UniformSet, params_name: Option<&str>, model: Mat4) -> Self {
        let params = match params_name.and_then(|name| set.param(name)) {
            Some(UniformValue::Vec4(v)) => v,
            _ => [0.0; 4],
        };

        Self {
            model: model.to_cols_array_2d(),
            params,
            resolution: set.resolution().unwrap_or([1.0, 1.0]),
            time: set.time().unwrap_or(0.0),
            _pad: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_wgsl_sizes() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 112);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 96);
    }

    #[test]
    fn material_snapshot_reads_shared_and_params() {
        let set = UniformSet::builder("grass")
            .with_shared()
            .param("grassParams", UniformValue::Vec4([6.0, 25.0, 0.25, 2.0]))
            .build();
        set.apply(crate::uniforms::SharedValue::Time(3.0));

        let u = MaterialUniform::from_set(&set, Some("grassParams"), Mat4::IDENTITY);
        assert_eq!(u.params, [6.0, 25.0, 0.25, 2.0]);
        assert_eq!(u.time, 3.0);
        assert_eq!(u.resolution, [1.0, 1.0]);

        let u = MaterialUniform::from_set(&set, None, Mat4::IDENTITY);
        assert_eq!(u.params, [0.0; 4]);
    }
}
