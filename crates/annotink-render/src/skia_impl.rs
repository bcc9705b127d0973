//! tiny-skia based renderer implementation.

use crate::font::Font;
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use annotink_core::capture::{CaptureError, CaptureResult, CapturedRegion, SurfaceCapture};
use annotink_core::hit_test::Corner;
use annotink_core::shapes::{
    ApproxTextMeasure, Arrow, Color, Element, ElementId, ElementStyle, ElementTrait, Freehand, Image,
    Text, TextMeasure, data_uri,
};
use kurbo::{Point, Rect};
use std::collections::HashMap;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, IntRect, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Stroke, StrokeDash, Transform,
};

/// Side length of the dash pattern used for selection boxes.
const DASH_LEN: f32 = 4.0;

/// CPU renderer drawing into an owned RGBA pixmap.
pub struct SkiaRenderer {
    pixmap: Pixmap,
    font: Option<Font>,
    measure: Box<dyn TextMeasure>,
    /// Decoded image elements keyed by element id. `None` marks data that
    /// failed to decode so it is not retried every frame.
    image_cache: HashMap<ElementId, Option<Pixmap>>,
    warned_missing_font: bool,
}

impl SkiaRenderer {
    /// Create a renderer with a `width` x `height` surface.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RendererError::InitFailed(format!("invalid surface size {}x{}", width, height))
        })?;
        Ok(Self {
            pixmap,
            font: None,
            measure: Box::new(ApproxTextMeasure),
            image_cache: HashMap::new(),
            warned_missing_font: false,
        })
    }

    /// Draw text with `font`.
    ///
    /// Editors hit-testing this text should use `font.measure()` too.
    pub fn with_font(mut self, font: Font) -> Self {
        self.measure = Box::new(font.measure());
        self.font = Some(font);
        self
    }

    pub fn font(&self) -> Option<&Font> {
        self.font.as_ref()
    }

    /// Surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Replace the surface. Contents are lost until the next render.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RendererError::Surface(format!("invalid surface size {}x{}", width, height)))?;
        Ok(())
    }

    /// The rendered pixels.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Unpremultiplied color of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::new(c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// Encode the whole surface as PNG.
    pub fn export_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RendererError::Encode(e.to_string()))
    }

    fn draw_element(&mut self, element: &Element) {
        match element {
            Element::Rectangle(r) => {
                let path = to_skia_rect(r.as_rect().abs()).map(PathBuilder::from_rect);
                draw_path(&mut self.pixmap, path.as_ref(), &r.style);
            }
            Element::Circle(c) => {
                let path = PathBuilder::from_circle(c.start.x as f32, c.start.y as f32, c.radius() as f32);
                draw_path(&mut self.pixmap, path.as_ref(), &c.style);
            }
            Element::Line(l) => {
                let path = segments_path(&[(l.start, l.end)]);
                stroke_path(&mut self.pixmap, path.as_ref(), &l.style);
            }
            Element::Arrow(a) => {
                let path = segments_path(&arrow_segments(a));
                stroke_path(&mut self.pixmap, path.as_ref(), &a.style);
            }
            Element::Freehand(f) => draw_freehand(&mut self.pixmap, f),
            Element::Text(t) => self.draw_text(t),
            Element::Image(i) | Element::RegionCapture(i) => self.draw_image(i),
        }
    }

    fn draw_text(&mut self, text: &Text) {
        match &self.font {
            Some(font) => font.draw_text(
                &mut self.pixmap,
                &text.content,
                text.start,
                text.font_size,
                text.style.stroke_color,
            ),
            None => {
                if !self.warned_missing_font {
                    log::warn!("No font loaded; text elements are not drawn");
                    self.warned_missing_font = true;
                }
            }
        }
    }

    fn draw_image(&mut self, image: &Image) {
        let decoded = self
            .image_cache
            .entry(image.id())
            .or_insert_with(|| decode_pixmap(image));
        let rect = image.as_rect().abs();
        match decoded {
            Some(src) if rect.area() > 0.0 => {
                let sx = rect.width() / f64::from(src.width());
                let sy = rect.height() / f64::from(src.height());
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..Default::default()
                };
                self.pixmap.draw_pixmap(
                    0,
                    0,
                    src.as_ref(),
                    &paint,
                    Transform::from_row(sx as f32, 0.0, 0.0, sy as f32, rect.x0 as f32, rect.y0 as f32),
                    None,
                );
            }
            _ => draw_image_placeholder(&mut self.pixmap, rect),
        }
    }

    fn draw_selection_box(&mut self, bounds: Rect, color: Color) {
        let Some(rect) = to_skia_rect(bounds) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width: 1.0,
            dash: StrokeDash::new(vec![DASH_LEN, DASH_LEN], 0.0),
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint_for(color), &stroke, Transform::identity(), None);
    }

    fn draw_handles(&mut self, handles: [(Corner, Rect); 4], color: Color) {
        for (_, handle) in handles {
            let Some(rect) = to_skia_rect(handle) else {
                continue;
            };
            let path = PathBuilder::from_rect(rect);
            // White fill
            self.pixmap.fill_path(
                &path,
                &paint_for(Color::white()),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
            // Colored border
            let stroke = Stroke {
                width: 1.5,
                ..Default::default()
            };
            self.pixmap
                .stroke_path(&path, &paint_for(color), &stroke, Transform::identity(), None);
        }
    }

    fn draw_capture_rect(&mut self, rect: Rect, color: Color) {
        let Some(rect) = to_skia_rect(rect.abs()) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let fill = Color::new(color.r, color.g, color.b, 25);
        self.pixmap
            .fill_path(&path, &paint_for(fill), FillRule::Winding, Transform::identity(), None);
        let stroke = Stroke {
            width: 1.0,
            dash: StrokeDash::new(vec![DASH_LEN, DASH_LEN], 0.0),
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint_for(color), &stroke, Transform::identity(), None);
    }

    fn encode_region(&self, region: Pixmap) -> CaptureResult<CapturedRegion> {
        let png = region
            .encode_png()
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
        Ok(CapturedRegion {
            data: data_uri("image/png", &png),
            width: region.width(),
            height: region.height(),
        })
    }
}

impl Renderer for SkiaRenderer {
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let bg = self.background_color(ctx);
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

        // Forget decoded images whose elements are gone.
        let scene = ctx.scene;
        self.image_cache.retain(|id, _| scene.contains(*id));

        let active = ctx.selection.active();
        for element in scene.elements() {
            let id = element.id();
            if ctx.editing_id == Some(id) {
                continue;
            }
            self.draw_element(element);
            if ctx.selection.contains(id) {
                let measure: &dyn TextMeasure = match ctx.measure {
                    Some(measure) => measure,
                    None => self.measure.as_ref(),
                };
                let bounds = ctx.hit_tester.handle_box(element, measure);
                let handles = (active == Some(id)).then(|| ctx.hit_tester.handle_rects(element, measure));
                self.draw_selection_box(bounds, ctx.selection_color);
                if let Some(handles) = handles {
                    self.draw_handles(handles, ctx.selection_color);
                }
            }
        }

        if let Some(pending) = &ctx.pending {
            self.draw_element(pending);
        }

        if let Some(rect) = ctx.capture_rect {
            self.draw_capture_rect(rect, ctx.selection_color);
        }
        Ok(())
    }
}

impl SurfaceCapture for SkiaRenderer {
    fn capture_region(&self, rect: Rect) -> CaptureResult<CapturedRegion> {
        let rect = rect.abs();
        if rect.area() <= 0.0 {
            return Err(CaptureError::EmptyRegion);
        }
        let surface = Rect::new(
            0.0,
            0.0,
            f64::from(self.pixmap.width()),
            f64::from(self.pixmap.height()),
        );
        let clipped = rect.intersect(surface);
        if clipped.area() <= 0.0 {
            return Err(CaptureError::OutOfBounds);
        }
        let int_rect = IntRect::from_ltrb(
            clipped.x0.floor() as i32,
            clipped.y0.floor() as i32,
            clipped.x1.ceil() as i32,
            clipped.y1.ceil() as i32,
        )
        .ok_or(CaptureError::EmptyRegion)?;
        let region = self
            .pixmap
            .clone_rect(int_rect)
            .ok_or(CaptureError::OutOfBounds)?;
        log::debug!("Captured {}x{} region", region.width(), region.height());
        self.encode_region(region)
    }

    fn capture_all(&self) -> CaptureResult<CapturedRegion> {
        self.encode_region(self.pixmap.clone())
    }
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn stroke_for(style: &ElementStyle) -> Stroke {
    Stroke {
        width: style.line_width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
}

/// Fill (if the style has one), then stroke.
fn draw_path(pixmap: &mut Pixmap, path: Option<&Path>, style: &ElementStyle) {
    let Some(path) = path else {
        return;
    };
    if let Some(fill) = style.fill_color {
        pixmap.fill_path(path, &paint_for(fill), FillRule::Winding, Transform::identity(), None);
    }
    pixmap.stroke_path(
        path,
        &paint_for(style.stroke_color),
        &stroke_for(style),
        Transform::identity(),
        None,
    );
}

fn stroke_path(pixmap: &mut Pixmap, path: Option<&Path>, style: &ElementStyle) {
    if let Some(path) = path {
        pixmap.stroke_path(
            path,
            &paint_for(style.stroke_color),
            &stroke_for(style),
            Transform::identity(),
            None,
        );
    }
}

fn segments_path(segments: &[(Point, Point)]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for (a, b) in segments {
        pb.move_to(a.x as f32, a.y as f32);
        pb.line_to(b.x as f32, b.y as f32);
    }
    pb.finish()
}

/// Shaft plus the two head strokes.
fn arrow_segments(arrow: &Arrow) -> Vec<(Point, Point)> {
    let mut segments = vec![(arrow.start, arrow.end)];
    if let Some((left, right)) = arrow.head() {
        segments.push((arrow.end, left));
        segments.push((arrow.end, right));
    }
    segments
}

fn draw_freehand(pixmap: &mut Pixmap, freehand: &Freehand) {
    let style = &freehand.style;
    match freehand.points.as_slice() {
        [] => {}
        [dot] => {
            let radius = (style.line_width / 2.0).max(0.5) as f32;
            if let Some(path) = PathBuilder::from_circle(dot.x as f32, dot.y as f32, radius) {
                pixmap.fill_path(
                    &path,
                    &paint_for(style.stroke_color),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
        }
        [first, rest @ ..] => {
            let mut pb = PathBuilder::new();
            pb.move_to(first.x as f32, first.y as f32);
            for p in rest {
                pb.line_to(p.x as f32, p.y as f32);
            }
            stroke_path(pixmap, pb.finish().as_ref(), style);
        }
    }
}

/// Gray box with an X for images that cannot be decoded.
fn draw_image_placeholder(pixmap: &mut Pixmap, rect: Rect) {
    let Some(skia_rect) = to_skia_rect(rect) else {
        return;
    };
    pixmap.fill_rect(
        skia_rect,
        &paint_for(Color::new(200, 200, 200, 255)),
        Transform::identity(),
        None,
    );
    let style = ElementStyle {
        stroke_color: Color::new(150, 150, 150, 255),
        fill_color: None,
        line_width: 2.0,
    };
    let cross = segments_path(&[
        (Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1)),
        (Point::new(rect.x1, rect.y0), Point::new(rect.x0, rect.y1)),
    ]);
    stroke_path(pixmap, cross.as_ref(), &style);
}

fn decode_pixmap(image: &Image) -> Option<Pixmap> {
    let Some(bytes) = image.bytes() else {
        log::warn!("Image {} has no decodable data URI", image.id());
        return None;
    };
    let decoded = match ::image::load_from_memory(&bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::warn!("Skipping image {}: {}", image.id(), e);
            return None;
        }
    };
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap = Pixmap::new(width, height)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}
