//! Viewport-change handling.
//!
//! Runs once eagerly at startup and again on every `Resized` /
//! `ScaleFactorChanged` notification, always between frame ticks.

use meadow_engine::coords::{clamp_pixel_ratio, ViewportState, DEFAULT_MAX_PIXEL_RATIO};

use crate::camera::PerspectiveCamera;
use crate::uniforms::{SharedValue, UniformRegistry};

/// Size of the output surface as reported by the platform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceMetrics {
    /// Logical pixels.
    pub width: f32,
    /// Logical pixels.
    pub height: f32,
    /// Unclamped device pixel ratio.
    pub scale_factor: f32,
}

impl SurfaceMetrics {
    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self { width, height, scale_factor }
    }
}

/// The drawable output whose backing buffer follows the viewport.
pub trait OutputSurface {
    /// Logical size.
    fn set_size(&mut self, width: f32, height: f32);
    /// Already clamped.
    fn set_pixel_ratio(&mut self, ratio: f32);
}

/// Keeps viewport state, camera projection, output size and every registered
/// `resolution` parameter consistent with the surface.
#[derive(Debug, Copy, Clone)]
pub struct ResizeCoordinator {
    max_pixel_ratio: f32,
}

impl Default for ResizeCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PIXEL_RATIO)
    }
}

impl ResizeCoordinator {
    pub fn new(max_pixel_ratio: f32) -> Self {
        Self { max_pixel_ratio }
    }

    pub fn max_pixel_ratio(&self) -> f32 {
        self.max_pixel_ratio
    }

    /// Applies new surface metrics. Returns the number of uniform sets whose
    /// `resolution` was overwritten; sets without one are skipped.
    ///
    /// A zero-area surface is recorded but leaves the camera aspect untouched.
    pub fn on_resize(
        &self,
        viewport: &mut ViewportState,
        metrics: SurfaceMetrics,
        registry: &UniformRegistry,
        camera: &mut PerspectiveCamera,
        output: &mut dyn OutputSurface,
    ) -> usize {
        let ratio = clamp_pixel_ratio(metrics.scale_factor, self.max_pixel_ratio);
        viewport.update(metrics.width, metrics.height, ratio);

        match viewport.aspect() {
            Some(aspect) => {
                camera.aspect = aspect;
                camera.update_projection_matrix();
            }
            None => log::debug!(
                "degenerate viewport {}x{}, keeping camera aspect {}",
                metrics.width,
                metrics.height,
                camera.aspect
            ),
        }

        output.set_size(viewport.width(), viewport.height());
        output.set_pixel_ratio(ratio);

        let resolution = viewport.device_size();
        let updated = registry.broadcast(SharedValue::Resolution(resolution));

        log::debug!(
            "resize: {}x{} @ {ratio} (reported {}), resolution {}x{}, {updated} set(s) updated",
            metrics.width,
            metrics.height,
            metrics.scale_factor,
            resolution[0],
            resolution[1],
        );
        updated
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::uniforms::{SharedUniform, UniformSet};

    #[derive(Default)]
    struct RecordingOutput {
        size: Option<(f32, f32)>,
        ratio: Option<f32>,
    }

    impl OutputSurface for RecordingOutput {
        fn set_size(&mut self, width: f32, height: f32) {
            self.size = Some((width, height));
        }

        fn set_pixel_ratio(&mut self, ratio: f32) {
            self.ratio = Some(ratio);
        }
    }

    struct Fixture {
        viewport: ViewportState,
        registry: UniformRegistry,
        camera: PerspectiveCamera,
        output: RecordingOutput,
        sets: Vec<Rc<UniformSet>>,
    }

    impl Fixture {
        fn new() -> Self {
            let sets = vec![
                Rc::new(UniformSet::builder("sky").with_shared().build()),
                Rc::new(UniformSet::builder("ground").with_shared().build()),
                Rc::new(UniformSet::builder("clock only").shared(SharedUniform::Time).build()),
            ];
            let mut registry = UniformRegistry::new();
            for set in &sets {
                registry.register(set);
            }
            Self {
                viewport: ViewportState::default(),
                registry,
                camera: PerspectiveCamera::new(75.0, 1.0, 0.1, 10000.0),
                output: RecordingOutput::default(),
                sets,
            }
        }

        fn resize(&mut self, width: f32, height: f32, ratio: f32) -> usize {
            ResizeCoordinator::default().on_resize(
                &mut self.viewport,
                SurfaceMetrics::new(width, height, ratio),
                &self.registry,
                &mut self.camera,
                &mut self.output,
            )
        }
    }

    // ── resolution ────────────────────────────────────────────────────────

    #[test]
    fn resolution_is_logical_size_times_ratio() {
        let mut fx = Fixture::new();
        assert_eq!(fx.resize(800.0, 600.0, 2.0), 2);

        assert_eq!(fx.sets[0].resolution(), Some([1600.0, 1200.0]));
        assert_eq!(fx.sets[1].resolution(), Some([1600.0, 1200.0]));
        assert_eq!(fx.sets[2].resolution(), None);
    }

    #[test]
    fn ratio_above_two_is_clamped() {
        let mut fx = Fixture::new();
        fx.resize(800.0, 600.0, 3.0);

        assert_eq!(fx.sets[0].resolution(), Some([1600.0, 1200.0]));
        assert_eq!(fx.viewport.pixel_ratio(), 2.0);
        assert_eq!(fx.output.ratio, Some(2.0));
    }

    #[test]
    fn later_resize_overwrites_earlier_one() {
        let mut fx = Fixture::new();
        fx.resize(800.0, 600.0, 2.0);
        fx.resize(1024.0, 768.0, 1.0);

        assert_eq!(fx.sets[0].resolution(), Some([1024.0, 768.0]));
    }

    // ── camera and output ─────────────────────────────────────────────────

    #[test]
    fn camera_aspect_and_output_follow_viewport() {
        let mut fx = Fixture::new();
        let before = fx.camera.projection_matrix();
        fx.resize(800.0, 400.0, 1.0);

        assert_eq!(fx.camera.aspect, 2.0);
        assert_ne!(fx.camera.projection_matrix(), before);
        assert_eq!(fx.output.size, Some((800.0, 400.0)));
    }

    #[test]
    fn zero_area_keeps_camera_aspect() {
        let mut fx = Fixture::new();
        fx.resize(800.0, 400.0, 1.0);
        fx.resize(800.0, 0.0, 1.0);

        assert_eq!(fx.camera.aspect, 2.0);
        assert_eq!(fx.viewport.height(), 0.0);
        assert_eq!(fx.sets[0].resolution(), Some([800.0, 0.0]));
    }
}
