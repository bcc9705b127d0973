//! Font loading, text metrics and glyph rasterization.

use crate::renderer::{RenderResult, RendererError};
use ab_glyph::{Font as _, FontArc, GlyphId, ScaleFont as _};
use annotink_core::shapes::{Color, LINE_HEIGHT_FACTOR, TextMeasure};
use kurbo::Point;
use std::path::Path;
use tiny_skia::{Paint, Pixmap, Transform};

/// A loaded TrueType/OpenType font.
#[derive(Clone)]
pub struct Font {
    inner: FontArc,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font").finish_non_exhaustive()
    }
}

impl Font {
    /// Parse font bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> RenderResult<Self> {
        let inner = FontArc::try_from_vec(bytes).map_err(|e| RendererError::Font(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Read and parse a font file.
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| RendererError::Font(format!("{}: {}", path.display(), e)))?;
        log::info!("Loaded font from {}", path.display());
        Self::from_bytes(bytes)
    }

    /// Advance width of one line, kerning included.
    pub fn line_width(&self, line: &str, font_size: f64) -> f64 {
        let scaled = self.inner.as_scaled(font_size as f32);
        let mut width = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for ch in line.chars() {
            let gid = self.inner.glyph_id(ch);
            if let Some(prev_id) = prev {
                width += scaled.kern(prev_id, gid);
            }
            width += scaled.h_advance(gid);
            prev = Some(gid);
        }
        f64::from(width)
    }

    /// A [`TextMeasure`] backed by this font.
    pub fn measure(&self) -> FontMeasure {
        FontMeasure { font: self.clone() }
    }

    /// Rasterize multi-line `content` with its top-left at `origin`.
    ///
    /// Lines are spaced `font_size * LINE_HEIGHT_FACTOR` apart.
    pub fn draw_text(
        &self,
        pixmap: &mut Pixmap,
        content: &str,
        origin: Point,
        font_size: f64,
        color: Color,
    ) {
        let line_height = font_size * LINE_HEIGHT_FACTOR;
        for (i, line) in content.split('\n').enumerate() {
            let top = origin.y + i as f64 * line_height;
            self.draw_line(pixmap, line, Point::new(origin.x, top), font_size, color);
        }
    }

    fn draw_line(&self, pixmap: &mut Pixmap, line: &str, top_left: Point, font_size: f64, color: Color) {
        let size = font_size as f32;
        let scaled = self.inner.as_scaled(size);
        let baseline = top_left.y as f32 + scaled.ascent();
        let mut cx = top_left.x as f32;
        let mut prev: Option<GlyphId> = None;

        let mut paint = Paint::default();
        paint.anti_alias = false;

        for ch in line.chars() {
            let gid = self.inner.glyph_id(ch);
            if let Some(prev_id) = prev {
                cx += scaled.kern(prev_id, gid);
            }
            let glyph = gid.with_scale_and_position(size, ab_glyph::point(cx, baseline));
            if let Some(outlined) = self.inner.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    if coverage <= 0.0 {
                        return;
                    }
                    let alpha = (coverage * f32::from(color.a)).round().min(255.0) as u8;
                    paint.set_color_rgba8(color.r, color.g, color.b, alpha);
                    let x = bounds.min.x + px as f32;
                    let y = bounds.min.y + py as f32;
                    if let Some(rect) = tiny_skia::Rect::from_xywh(x, y, 1.0, 1.0) {
                        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                    }
                });
            }
            cx += scaled.h_advance(gid);
            prev = Some(gid);
        }
    }
}

/// Exact text metrics from a loaded font.
#[derive(Debug, Clone)]
pub struct FontMeasure {
    font: Font,
}

impl TextMeasure for FontMeasure {
    fn line_width(&self, line: &str, font_size: f64) -> f64 {
        self.font.line_width(line, font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_font() -> Font {
        Font::from_bytes(include_bytes!("../assets/DejaVuSansMono.ttf").to_vec()).unwrap()
    }

    #[test]
    fn test_monospace_line_width() {
        let font = test_font();
        let one = font.line_width("I", 40.0);
        assert!(one > 0.0);
        assert!((font.line_width("IIII", 40.0) - 4.0 * one).abs() < 1e-3);
        assert!((font.measure().line_width("I", 20.0) - one / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_draw_text_second_line_offset() {
        let font = test_font();
        let mut pixmap = Pixmap::new(100, 200).unwrap();
        font.draw_text(&mut pixmap, "\nI", Point::new(10.0, 10.0), 40.0, Color::black());

        let inked_rows: Vec<u32> = (0..200)
            .filter(|y| (0..100).any(|x| pixmap.pixel(x, *y).is_some_and(|p| p.alpha() > 0)))
            .collect();
        // The empty first line pushes the glyph to start at 10 + 48.
        assert!(!inked_rows.is_empty());
        assert!(inked_rows.iter().all(|y| *y >= 58 && *y < 106));
    }

    #[test]
    fn test_invalid_font_bytes() {
        let result = Font::from_bytes(b"definitely not a font".to_vec());
        assert!(matches!(result, Err(RendererError::Font(_))));
    }

    #[test]
    fn test_missing_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Font::load(dir.path().join("missing.ttf"));
        assert!(matches!(result, Err(RendererError::Font(_))));
    }
}
