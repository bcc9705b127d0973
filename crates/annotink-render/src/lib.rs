//! AnnotInk Render Library
//!
//! Renderer abstraction and a CPU implementation over a tiny-skia pixmap.
//! The renderer also serves as the surface the editor captures regions from.

mod font;
mod renderer;
mod skia_impl;

pub use font::{Font, FontMeasure};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use skia_impl::SkiaRenderer;
