//! Texture sources.
//!
//! Decoding is asynchronous: [`ImageDecoder::load_async`] returns a future and
//! the filesystem implementation does the work on a worker thread, so the frame
//! loop keeps running while a texture is being read.

mod decoder;
mod texture;

pub use decoder::{FsImageDecoder, ImageDecoder};
pub use texture::{DecodedImage, Texture, WrapMode};
