//! The cooperative per-frame loop.
//!
//! [`FrameScheduler::advance`] runs one tick and re-arms the loop by asking the
//! host for the next frame. A tick that fails anywhere returns before re-arming,
//! so the host never calls back and the last presented frame stays on screen.

use std::time::Instant;

use meadow_engine::time::{FrameClock, FrameTime};

use crate::camera::{CameraControls, PerspectiveCamera};
use crate::error::TickError;
use crate::scene::Scene;
use crate::uniforms::{SharedValue, UniformRegistry};

/// Draws a scene through a camera.
pub trait FrameOutput {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> anyhow::Result<()>;
}

/// Host frame pacing: schedules exactly one more tick.
pub trait FramePacer {
    fn request_frame(&mut self);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// Everything a tick touches, borrowed for its duration.
pub struct TickCtx<'a> {
    pub registry: &'a UniformRegistry,
    pub scene: &'a Scene,
    pub camera: &'a mut PerspectiveCamera,
    pub controls: &'a mut dyn CameraControls,
    pub output: &'a mut dyn FrameOutput,
    pub pacer: &'a mut dyn FramePacer,
}

/// Owns the clock and the Idle → Running transition.
#[derive(Debug)]
pub struct FrameScheduler {
    clock: FrameClock,
    state: SchedulerState,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            clock: FrameClock::new(),
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Seconds since `start`, `0.0` while idle.
    pub fn elapsed_at(&self, now: Instant) -> f32 {
        self.clock.elapsed_at(now)
    }

    /// Starts the clock and requests the first tick.
    pub fn start(&mut self, pacer: &mut dyn FramePacer) {
        self.start_at(Instant::now(), pacer);
    }

    /// Starts the clock at `origin`. Calling this while running is a no-op.
    pub fn start_at(&mut self, origin: Instant, pacer: &mut dyn FramePacer) {
        if self.state == SchedulerState::Running {
            log::warn!("frame scheduler already running");
            return;
        }
        self.clock.start_at(origin);
        self.state = SchedulerState::Running;
        pacer.request_frame();
    }

    pub fn advance(&mut self, ctx: TickCtx<'_>) -> Result<FrameTime, TickError> {
        self.advance_at(Instant::now(), ctx)
    }

    /// Runs one tick at `now`: time uniforms, camera controls, render, re-arm.
    pub fn advance_at(&mut self, now: Instant, ctx: TickCtx<'_>) -> Result<FrameTime, TickError> {
        if self.state != SchedulerState::Running {
            return Err(TickError::NotStarted);
        }

        let frame = self.clock.tick_at(now);
        ctx.registry.broadcast(SharedValue::Time(frame.elapsed));
        ctx.controls.update(ctx.camera);

        if let Err(e) = ctx.output.render(ctx.scene, ctx.camera) {
            log::error!("frame {} aborted: {e:#}", frame.frame_index);
            return Err(TickError::Render(e));
        }

        ctx.pacer.request_frame();
        Ok(frame)
    }
}
