use std::future::Future;
use std::path::{Path, PathBuf};

use futures::channel::oneshot;

use crate::error::ResourceLoadError;

use super::DecodedImage;

/// Asynchronous image source.
///
/// Futures must not borrow the decoder so that callers can keep them pending
/// across frames.
pub trait ImageDecoder {
    fn load_async(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<DecodedImage, ResourceLoadError>> + 'static;
}

/// Reads and decodes image files on a short-lived worker thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageDecoder;

impl FsImageDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous read + decode, run on the worker thread.
    pub fn decode_file(path: &Path) -> Result<DecodedImage, ResourceLoadError> {
        let bytes = std::fs::read(path).map_err(|source| ResourceLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let rgba = image::load_from_memory(&bytes)
            .map_err(|source| ResourceLoadError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();

        Ok(DecodedImage {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }
}

impl ImageDecoder for FsImageDecoder {
    fn load_async(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<DecodedImage, ResourceLoadError>> + 'static {
        let path: PathBuf = path.to_path_buf();
        let (sender, receiver) = oneshot::channel();

        let worker_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("meadow-decode".to_string())
            .spawn(move || {
                let result = Self::decode_file(&worker_path);
                if sender.send(result).is_err() {
                    log::debug!("decode of '{}' finished after its receiver was dropped", worker_path.display());
                }
            });

        if let Err(e) = spawned {
            log::error!("failed to spawn decode thread for '{}': {e}", path.display());
        }

        async move {
            match receiver.await {
                Ok(result) => result,
                Err(oneshot::Canceled) => Err(ResourceLoadError::Cancelled { path }),
            }
        }
    }
}
