//! GPU rendering handles.
//!
//! Renderers live in higher layers and own their GPU resources (pipelines,
//! buffers, textures). This module only defines the small per-frame contexts the
//! runtime hands to them.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
