//! Reading back already-rendered pixels from the host surface.

use kurbo::Rect;
use thiserror::Error;

/// Surface read-back errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Capture region is empty")]
    EmptyRegion,
    #[error("Capture region lies outside the surface")]
    OutOfBounds,
    #[error("Failed to encode captured pixels: {0}")]
    Encode(String),
}

/// Result type for surface captures.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Pixels copied out of the surface, encoded as a data URI.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRegion {
    pub data: String,
    pub width: u32,
    pub height: u32,
}

/// The host's "export current surface as image" primitive.
pub trait SurfaceCapture {
    /// Encode the pixels inside `rect` (surface coordinates).
    fn capture_region(&self, rect: Rect) -> CaptureResult<CapturedRegion>;

    /// Encode the whole surface.
    fn capture_all(&self) -> CaptureResult<CapturedRegion>;
}
