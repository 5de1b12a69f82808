//! Shader uniform sets and the registry that keeps shared parameters in sync.
//!
//! Two parameters are shared by every program and written by the frame loop and
//! the resize path: `time` and `resolution`. They are addressed through the
//! closed [`SharedUniform`] enum; everything else in a set is element-specific
//! and invisible to the registry writers.

mod registry;
mod set;

pub use registry::UniformRegistry;
pub use set::{SharedUniform, SharedValue, UniformSet, UniformSetBuilder, UniformValue};
