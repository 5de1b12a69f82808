//! Error kinds of the scene layer.
//!
//! Construction paths fail fast with these; the frame loop reports a
//! [`TickError`] and stops re-arming itself.

use std::path::PathBuf;

use thiserror::Error;

use crate::scene::ElementKind;

/// Invalid construction parameters, rejected before any geometry is emitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("blade segment count must be at least 1 (got {0})")]
    SegmentCount(i64),

    #[error("grass field must contain at least one instance")]
    InstanceCount,

    #[error("patch size must be finite and positive (got {0})")]
    PatchSize(f32),

    #[error("blade segment count {0} exceeds the supported maximum")]
    TooManySegments(i64),
}

/// A texture could not be read or decoded.
#[derive(Debug, Error)]
pub enum ResourceLoadError {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode '{path}'")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("decoder for '{path}' went away before finishing")]
    Cancelled { path: PathBuf },
}

impl ResourceLoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Decode { path, .. } | Self::Cancelled { path } => path,
        }
    }
}

/// Failure while building one visual element.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("{kind} element misconfigured")]
    Configuration {
        kind: ElementKind,
        #[source]
        source: ConfigurationError,
    },

    #[error("{kind} element texture unavailable")]
    ResourceLoad {
        kind: ElementKind,
        #[source]
        source: ResourceLoadError,
    },
}

impl SceneError {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Configuration { kind, .. } | Self::ResourceLoad { kind, .. } => *kind,
        }
    }
}

/// Failure inside one frame tick. The tick is abandoned and not re-armed.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("frame scheduler was not started")]
    NotStarted,

    #[error("render submission failed")]
    Render(#[source] anyhow::Error),
}
