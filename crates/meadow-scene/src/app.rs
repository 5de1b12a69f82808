//! The meadow application: wires the scene layer into the engine runtime.

use meadow_engine::coords::ViewportState;
use meadow_engine::core::{App, AppControl, FrameCtx, FrameOutcome, SurfaceCtx};
use meadow_engine::device::{Gpu, GpuInit};
use meadow_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::assets::{FsImageDecoder, ImageDecoder};
use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::config::ExperienceConfig;
use crate::frame::{FrameOutput, FramePacer, FrameScheduler, SchedulerState, TickCtx};
use crate::render::SceneRenderer;
use crate::resize::{OutputSurface, ResizeCoordinator, SurfaceMetrics};
use crate::scene::{PendingElements, Scene, SceneAssembler};
use crate::uniforms::{SharedValue, UniformRegistry};

/// Sky, ground and grass field under an orbiting camera.
pub struct Experience {
    config: ExperienceConfig,

    scene: Scene,
    registry: UniformRegistry,
    pending: PendingElements,

    viewport: ViewportState,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    /// Physical surface height, for converting drags into angles.
    surface_height: f32,

    resize: ResizeCoordinator,
    scheduler: FrameScheduler,
    renderer: SceneRenderer,

    /// Set once a tick fails; the last frame stays on screen.
    halted: bool,
}

impl Experience {
    pub fn new(config: ExperienceConfig) -> Self {
        Self::with_decoder(config, FsImageDecoder::new())
    }

    /// Builds the sky immediately and starts loading the textured elements;
    /// those are installed by the frame loop as their textures arrive.
    pub fn with_decoder<D: ImageDecoder>(config: ExperienceConfig, decoder: D) -> Self {
        let mut scene = Scene::new();
        let mut registry = UniformRegistry::new();

        let assembler = SceneAssembler::new(config.scene.clone(), decoder);
        let pending = assembler.start(&mut scene, &mut registry);

        let (width, height) = config.initial_size;
        let camera = PerspectiveCamera::from_config(&config.camera, (width / height) as f32);
        let controls = OrbitControls::from_config(&config.camera);

        Self {
            resize: ResizeCoordinator::new(config.max_pixel_ratio),
            config,
            scene,
            registry,
            pending,
            viewport: ViewportState::default(),
            camera,
            controls,
            surface_height: height as f32,
            scheduler: FrameScheduler::new(),
            renderer: SceneRenderer::new(),
            halted: false,
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        let (width, height) = self.config.initial_size;
        RuntimeConfig {
            title: self.config.title.clone(),
            initial_size: LogicalSize::new(width, height),
        }
    }

    /// Opens the window and runs until it is closed.
    pub fn run(self) -> anyhow::Result<()> {
        let runtime = self.runtime_config();
        Runtime::run(runtime, GpuInit::default(), self)
    }

    fn install_ready_elements(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let report = self.pending.poll_install(&mut self.scene, &mut self.registry);
        if !report.installed.is_empty() {
            // Late elements missed the resize broadcasts.
            self.registry
                .broadcast(SharedValue::Resolution(self.viewport.device_size()));
        }
    }

    /// Applies new surface metrics. The first call starts the frame loop;
    /// later ones ask for a frame so the resized surface gets drawn.
    fn surface_resized(
        &mut self,
        metrics: SurfaceMetrics,
        output: &mut dyn OutputSurface,
        pacer: &mut dyn FramePacer,
    ) {
        self.resize.on_resize(
            &mut self.viewport,
            metrics,
            &self.registry,
            &mut self.camera,
            output,
        );

        if self.scheduler.state() == SchedulerState::Idle {
            self.scheduler.start(pacer);
            log::info!(
                "experience initialized ({} element(s) ready, {} loading)",
                self.scene.len(),
                self.pending.len()
            );
        } else if !self.halted {
            pacer.request_frame();
        }
    }

    /// One frame: installs elements that finished loading, then ticks.
    fn frame(&mut self, output: &mut dyn FrameOutput, pacer: &mut dyn FramePacer) {
        if self.halted {
            return;
        }

        self.install_ready_elements();

        let result = self.scheduler.advance(TickCtx {
            registry: &self.registry,
            scene: &self.scene,
            camera: &mut self.camera,
            controls: &mut self.controls,
            output,
            pacer,
        });

        if result.is_err() {
            self.halted = true;
        }
    }
}

impl App for Experience {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        self.controls.handle_window_event(event, self.surface_height);
        AppControl::Continue
    }

    fn on_surface_changed(&mut self, ctx: &mut SurfaceCtx<'_, '_>) -> AppControl {
        let (width, height) = ctx.window.logical_size();
        let metrics = SurfaceMetrics::new(width, height, ctx.window.scale_factor());
        self.surface_height = ctx.window.window.inner_size().height as f32;

        let mut output = GpuOutput::new(ctx.gpu);
        let mut pacer = DeferredPacer::default();
        self.surface_resized(metrics, &mut output, &mut pacer);
        output.apply();

        if pacer.requested {
            ctx.window.request_redraw();
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let mut renderer = std::mem::take(&mut self.renderer);
        let mut pacer = DeferredPacer::default();
        let mut output = GpuFrameOutput {
            frame: &mut *ctx,
            renderer: &mut renderer,
            clear: self.config.clear_color,
        };

        self.frame(&mut output, &mut pacer);
        self.renderer = renderer;

        if pacer.requested {
            ctx.window.request_redraw();
        }
        AppControl::Continue
    }
}

/// Collects a frame request and forwards it once the window is reachable again.
#[derive(Default)]
struct DeferredPacer {
    requested: bool,
}

impl FramePacer for DeferredPacer {
    fn request_frame(&mut self) {
        self.requested = true;
    }
}

/// Sizes the swapchain to `logical size × clamped ratio`.
struct GpuOutput<'a, 'w> {
    gpu: &'a mut Gpu<'w>,
    size: (f32, f32),
    ratio: f32,
}

impl<'a, 'w> GpuOutput<'a, 'w> {
    fn new(gpu: &'a mut Gpu<'w>) -> Self {
        Self {
            gpu,
            size: (0.0, 0.0),
            ratio: 1.0,
        }
    }

    fn apply(self) {
        let width = (self.size.0 * self.ratio).round().max(0.0) as u32;
        let height = (self.size.1 * self.ratio).round().max(0.0) as u32;
        self.gpu.resize(PhysicalSize::new(width, height));
    }
}

impl OutputSurface for GpuOutput<'_, '_> {
    fn set_size(&mut self, width: f32, height: f32) {
        self.size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.ratio = ratio;
    }
}

/// Renders through the engine's frame context.
struct GpuFrameOutput<'f, 'a, 'w> {
    frame: &'f mut FrameCtx<'a, 'w>,
    renderer: &'f mut SceneRenderer,
    clear: wgpu::Color,
}

impl FrameOutput for GpuFrameOutput<'_, '_, '_> {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> anyhow::Result<()> {
        let renderer = &mut *self.renderer;
        let outcome = self.frame.render(self.clear, |rctx, target| {
            renderer.render(rctx, target, scene, camera);
        });

        match outcome {
            FrameOutcome::Skipped(action) if action.is_fatal() => {
                anyhow::bail!("surface unusable: {action:?}")
            }
            FrameOutcome::Skipped(_) | FrameOutcome::Presented => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::future::Future;
    use std::path::Path;
    use std::rc::Rc;
    use std::task::Poll;

    use super::*;
    use crate::assets::DecodedImage;
    use crate::error::ResourceLoadError;
    use crate::scene::ElementKind;

    /// Textures stay pending until the gate is opened.
    struct GatedDecoder {
        open: Rc<Cell<bool>>,
    }

    impl ImageDecoder for GatedDecoder {
        fn load_async(
            &self,
            _path: &Path,
        ) -> impl Future<Output = Result<DecodedImage, ResourceLoadError>> + 'static {
            let open = self.open.clone();
            futures::future::poll_fn(move |_| {
                if open.get() {
                    Poll::Ready(Ok(DecodedImage::solid(2, 2, [255; 4])))
                } else {
                    Poll::Pending
                }
            })
        }
    }

    #[derive(Default)]
    struct NullSurface;

    impl OutputSurface for NullSurface {
        fn set_size(&mut self, _width: f32, _height: f32) {}
        fn set_pixel_ratio(&mut self, _ratio: f32) {}
    }

    #[derive(Default)]
    struct CountingPacer {
        requests: usize,
    }

    impl FramePacer for CountingPacer {
        fn request_frame(&mut self) {
            self.requests += 1;
        }
    }

    struct ScriptedOutput {
        renders: usize,
        fail: bool,
    }

    impl FrameOutput for ScriptedOutput {
        fn render(&mut self, _scene: &Scene, _camera: &PerspectiveCamera) -> anyhow::Result<()> {
            self.renders += 1;
            if self.fail {
                anyhow::bail!("surface lost");
            }
            Ok(())
        }
    }

    fn small_config() -> ExperienceConfig {
        let mut config = ExperienceConfig::default();
        config.scene.sky_width_segments = 8;
        config.scene.sky_height_segments = 4;
        config.scene.ground_segments = 4;
        config
    }

    fn gated_experience() -> (Experience, Rc<Cell<bool>>) {
        let open = Rc::new(Cell::new(false));
        let decoder = GatedDecoder { open: open.clone() };
        (Experience::with_decoder(small_config(), decoder), open)
    }

    fn resolution_of(app: &Experience, kind: ElementKind) -> Option<[f32; 2]> {
        app.scene.node(kind)?.material.uniforms().resolution()
    }

    // ── late elements ─────────────────────────────────────────────────────

    #[test]
    fn late_elements_receive_the_current_resolution() {
        let (mut app, open) = gated_experience();
        let mut pacer = CountingPacer::default();
        app.surface_resized(SurfaceMetrics::new(800.0, 600.0, 2.0), &mut NullSurface, &mut pacer);

        assert_eq!(app.pending.len(), 2);
        assert_eq!(resolution_of(&app, ElementKind::Sky), Some([1600.0, 1200.0]));
        assert!(!app.scene.contains(ElementKind::Grass));

        open.set(true);
        app.install_ready_elements();

        assert!(app.pending.is_empty());
        assert_eq!(resolution_of(&app, ElementKind::Ground), Some([1600.0, 1200.0]));
        assert_eq!(resolution_of(&app, ElementKind::Grass), Some([1600.0, 1200.0]));
    }

    #[test]
    fn frame_installs_elements_that_finished_loading() {
        let (mut app, open) = gated_experience();
        let mut pacer = CountingPacer::default();
        app.surface_resized(SurfaceMetrics::new(800.0, 600.0, 3.0), &mut NullSurface, &mut pacer);

        let mut output = ScriptedOutput { renders: 0, fail: false };
        app.frame(&mut output, &mut pacer);
        assert_eq!(app.scene.len(), 1);

        open.set(true);
        app.frame(&mut output, &mut pacer);

        assert_eq!(app.scene.len(), 3);
        assert_eq!(resolution_of(&app, ElementKind::Grass), Some([1600.0, 1200.0]));
        assert_eq!(output.renders, 2);
    }

    // ── frame loop ────────────────────────────────────────────────────────

    #[test]
    fn first_resize_starts_the_loop_and_later_ones_request_a_frame() {
        let (mut app, _open) = gated_experience();
        let mut pacer = CountingPacer::default();

        app.surface_resized(SurfaceMetrics::new(800.0, 600.0, 1.0), &mut NullSurface, &mut pacer);
        assert_eq!(app.scheduler.state(), SchedulerState::Running);
        assert_eq!(pacer.requests, 1);

        app.surface_resized(SurfaceMetrics::new(640.0, 480.0, 1.0), &mut NullSurface, &mut pacer);
        assert_eq!(pacer.requests, 2);
    }

    #[test]
    fn failed_tick_halts_and_ignores_stray_redraws() {
        let (mut app, _open) = gated_experience();
        let mut pacer = CountingPacer::default();
        app.surface_resized(SurfaceMetrics::new(800.0, 600.0, 1.0), &mut NullSurface, &mut pacer);

        let mut output = ScriptedOutput { renders: 0, fail: true };
        app.frame(&mut output, &mut pacer);
        assert!(app.halted);
        assert_eq!(pacer.requests, 1);

        output.fail = false;
        app.frame(&mut output, &mut pacer);
        app.surface_resized(SurfaceMetrics::new(640.0, 480.0, 1.0), &mut NullSurface, &mut pacer);

        assert_eq!(output.renders, 1);
        assert_eq!(pacer.requests, 1);
    }
}
