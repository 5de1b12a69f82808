use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::{FrameCtx, SurfaceCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// The runtime never redraws on its own: an app that wants another frame calls
/// [`WindowCtx::request_redraw`] from `on_frame` (or from `on_surface_changed`).
pub trait App {
    /// Called for every window event, before the runtime's own handling.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once right after a window and its GPU context are created, and
    /// again whenever the window size or scale factor changes.
    ///
    /// The default reconfigures the surface to the window's physical size.
    fn on_surface_changed(&mut self, ctx: &mut SurfaceCtx<'_, '_>) -> AppControl {
        let size = ctx.window.window.inner_size();
        ctx.gpu.resize(size);
        ctx.window.request_redraw();
        AppControl::Continue
    }

    /// Called once per redraw request per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
