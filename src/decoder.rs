//! Turning selected files into pixels

use crate::domain::FileHandle;
use crate::error::DecodeError;
use image::{DynamicImage, GenericImageView};
use std::future::Future;
use std::path::Path;

/// A decoded image with known pixel dimensions
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: DynamicImage,
}

impl DecodedImage {
    pub fn new(pixels: DynamicImage) -> Result<Self, DecodeError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::EmptyImage);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Asynchronous "file → pixel buffer" service
pub trait ImageDecoder: Send + Sync {
    fn decode(
        &self,
        handle: &FileHandle,
    ) -> impl Future<Output = Result<DecodedImage, DecodeError>> + Send;
}

/// Reads the bytes of a file and decodes them with the `image` crate
pub fn decode_file(path: &Path) -> Result<DecodedImage, DecodeError> {
    let bytes = std::fs::read(path)?;
    let pixels = image::load_from_memory(&bytes)?;
    DecodedImage::new(pixels)
}

/// Decodes files from disk on tokio's blocking pool
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageDecoder;

impl ImageDecoder for FsImageDecoder {
    async fn decode(&self, handle: &FileHandle) -> Result<DecodedImage, DecodeError> {
        let path = handle.path.clone();
        tokio::task::spawn_blocking(move || decode_file(&path))
            .await
            .map_err(|e| DecodeError::Task(e.to_string()))?
    }
}
