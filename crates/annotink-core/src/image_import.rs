//! Decoding external images for insertion into the scene.

use crate::shapes::{ImageFormat, data_uri};
use image::imageops::FilterType;
use std::io::Cursor;
use thiserror::Error;

/// Image import errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("No image data")]
    Empty,
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Result type for image import.
pub type ImportResult<T> = Result<T, ImportError>;

/// A decoded image ready to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedImage {
    /// Encoded pixels as a data URI.
    pub data: String,
    /// Pixel width after downsizing.
    pub width: u32,
    /// Pixel height after downsizing.
    pub height: u32,
}

/// Target size fitting `width` x `height` inside `max_dimension`, keeping
/// the aspect ratio. Images already small enough keep their size.
pub fn fit_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let largest = width.max(height);
    if largest <= max_dimension || largest == 0 {
        return (width, height);
    }
    let scale = max_dimension as f64 / largest as f64;
    let scaled = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Decode `bytes`, downsizing so neither side exceeds `max_dimension`.
///
/// Oversized images are re-encoded as PNG; others keep their original
/// encoding.
pub fn decode_import(bytes: &[u8], max_dimension: u32) -> ImportResult<ImportedImage> {
    if bytes.is_empty() {
        return Err(ImportError::Empty);
    }
    let format = ImageFormat::from_magic_bytes(bytes)
        .ok_or_else(|| ImportError::Decode("unrecognized image format".to_string()))?;
    let decoded = image::load_from_memory(bytes).map_err(|e| {
        log::warn!("Image import failed: {}", e);
        ImportError::Decode(e.to_string())
    })?;

    let (width, height) = (decoded.width(), decoded.height());
    let (target_w, target_h) = fit_dimensions(width, height, max_dimension);
    if (target_w, target_h) == (width, height) {
        return Ok(ImportedImage {
            data: data_uri(format.mime_type(), bytes),
            width,
            height,
        });
    }

    log::debug!("Downsizing import from {}x{} to {}x{}", width, height, target_w, target_h);
    let resized = decoded.resize_exact(target_w, target_h, FilterType::Triangle);
    let mut encoded = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
        .map_err(|e| ImportError::Encode(e.to_string()))?;

    Ok(ImportedImage {
        data: data_uri(ImageFormat::Png.mime_type(), &encoded),
        width: target_w,
        height: target_h,
    })
}
