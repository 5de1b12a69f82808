//! Configuration structs for the field, the scene and the camera.
//!
//! Plain data with `Default` impls; the defaults reproduce the reference scene.

use std::path::PathBuf;

use glam::Vec3;
use meadow_engine::coords::DEFAULT_MAX_PIXEL_RATIO;

/// Environment variable overriding [`SceneConfig::asset_root`].
pub const ASSET_ROOT_ENV: &str = "MEADOW_ASSETS";

/// Grass field parameters.
///
/// `segment_count` is signed so that invalid negative input can be expressed and
/// rejected by the geometry builder instead of wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub segment_count: i64,
    pub instance_count: u32,
    pub patch_size: f32,
    pub blade_width: f32,
    pub blade_height: f32,
}

impl FieldConfig {
    /// `(segments, patch size, blade width, blade height)` as fed to the grass shader.
    pub fn shader_params(&self) -> [f32; 4] {
        [
            self.segment_count as f32,
            self.patch_size,
            self.blade_width,
            self.blade_height,
        ]
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            segment_count: 6,
            instance_count: 32 * 1024,
            patch_size: 25.0,
            blade_width: 0.25,
            blade_height: 2.0,
        }
    }
}

/// Scene composition: element geometry and texture locations.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub field: FieldConfig,

    pub sky_radius: f32,
    pub sky_width_segments: u32,
    pub sky_height_segments: u32,

    /// Subdivisions per side of the unit ground plane.
    pub ground_segments: u32,
    /// Uniform scale applied to the unit ground plane.
    pub ground_scale: f32,

    /// Directory the texture paths below are resolved against.
    pub asset_root: PathBuf,
    pub ground_texture: PathBuf,
    pub grass_tile_texture: PathBuf,

    /// Direction the directional light shines *from*.
    pub light_position: Vec3,
    pub light_intensity: f32,
}

impl SceneConfig {
    /// Default configuration with `asset_root` taken from `MEADOW_ASSETS` if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(root) = std::env::var_os(ASSET_ROOT_ENV) {
            config.asset_root = PathBuf::from(root);
        }
        config
    }

    pub fn ground_texture_path(&self) -> PathBuf {
        self.asset_root.join(&self.ground_texture)
    }

    pub fn grass_tile_texture_path(&self) -> PathBuf {
        self.asset_root.join(&self.grass_tile_texture)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            sky_radius: 5000.0,
            sky_width_segments: 32,
            sky_height_segments: 15,
            ground_segments: 512,
            ground_scale: 1000.0,
            asset_root: PathBuf::from("assets"),
            ground_texture: PathBuf::from("textures/grid.png"),
            grass_tile_texture: PathBuf::from("textures/ijc_logo_texture_3.JPG"),
            light_position: Vec3::new(1.0, 1.0, 1.0),
            light_intensity: 1.0,
        }
    }
}

/// Perspective camera and orbit-control parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 10000.0,
            position: Vec3::new(10.0, 5.0, 5.0),
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: 0.05,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceConfig {
    pub title: String,
    /// Initial window size in logical pixels.
    pub initial_size: (f64, f64),
    pub max_pixel_ratio: f32,
    pub clear_color: wgpu::Color,
    pub scene: SceneConfig,
    pub camera: CameraConfig,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            title: "meadow".to_string(),
            initial_size: (1280.0, 720.0),
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
            clear_color: wgpu::Color::BLACK,
            scene: SceneConfig::from_env(),
            camera: CameraConfig::default(),
        }
    }
}
