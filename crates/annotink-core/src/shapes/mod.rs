//! Drawable element definitions.

mod arrow;
mod circle;
mod freehand;
mod image;
mod line;
mod rectangle;
mod text;

pub use arrow::{ARROW_HEAD_ANGLE, ARROW_HEAD_LENGTH, Arrow, arrow_head};
pub use circle::Circle;
pub use freehand::Freehand;
pub use image::{Image, ImageFormat, data_uri, decode_data_uri};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::{ApproxTextMeasure, LINE_HEIGHT_FACTOR, Text, TextMeasure};

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Identifier shared by every member of a rigid group.
pub type GroupId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
                255,
            )),
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb` (or `#rrggbbaa` when not opaque).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Style shared by every element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    /// Stroke color.
    pub stroke_color: Color,
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill_color: Option<Color>,
    /// Stroke width in pixels.
    pub line_width: f64,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::black(),
            fill_color: None,
            line_width: 2.0,
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Axis-aligned box spanned by two corner points, in any order.
pub fn normalized_rect(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

pub(crate) fn point_is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Behavior common to all element kinds.
pub trait ElementTrait {
    /// Get the unique identifier.
    fn id(&self) -> ElementId;

    /// Get the style.
    fn style(&self) -> &ElementStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ElementStyle;

    /// Group this element belongs to, if any.
    fn group_id(&self) -> Option<GroupId>;

    /// Assign or clear the group.
    fn set_group_id(&mut self, group_id: Option<GroupId>);

    /// Translate every geometric coordinate.
    fn translate(&mut self, delta: Vec2);

    /// Multiply every vertical coordinate (and vertical extent) by `factor`.
    fn scale_y(&mut self, factor: f64);

    /// Axis-aligned geometric bounds (without any hit tolerance).
    fn bounds(&self, measure: &dyn TextMeasure) -> Rect;

    /// True when no geometry field is NaN or infinite.
    fn is_finite(&self) -> bool;
}

/// Every drawable element, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Element {
    Freehand(Freehand),
    Rectangle(Rectangle),
    Circle(Circle),
    Line(Line),
    Arrow(Arrow),
    Text(Text),
    Image(Image),
    /// An image copied from a sub-rectangle of the rendered surface.
    RegionCapture(Image),
}

impl Element {
    fn inner(&self) -> &dyn ElementTrait {
        match self {
            Element::Freehand(e) => e,
            Element::Rectangle(e) => e,
            Element::Circle(e) => e,
            Element::Line(e) => e,
            Element::Arrow(e) => e,
            Element::Text(e) => e,
            Element::Image(e) | Element::RegionCapture(e) => e,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ElementTrait {
        match self {
            Element::Freehand(e) => e,
            Element::Rectangle(e) => e,
            Element::Circle(e) => e,
            Element::Line(e) => e,
            Element::Arrow(e) => e,
            Element::Text(e) => e,
            Element::Image(e) | Element::RegionCapture(e) => e,
        }
    }

    pub fn id(&self) -> ElementId {
        self.inner().id()
    }

    pub fn style(&self) -> &ElementStyle {
        self.inner().style()
    }

    pub fn style_mut(&mut self) -> &mut ElementStyle {
        self.inner_mut().style_mut()
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.inner().group_id()
    }

    pub fn set_group_id(&mut self, group_id: Option<GroupId>) {
        self.inner_mut().set_group_id(group_id);
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.inner_mut().translate(delta);
    }

    pub fn scale_y(&mut self, factor: f64) {
        self.inner_mut().scale_y(factor);
    }

    pub fn bounds(&self, measure: &dyn TextMeasure) -> Rect {
        self.inner().bounds(measure)
    }

    pub fn is_finite(&self) -> bool {
        self.inner().is_finite() && self.style().line_width.is_finite()
    }

    /// Kind tag as it appears in snapshots.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Freehand(_) => "freehand",
            Element::Rectangle(_) => "rectangle",
            Element::Circle(_) => "circle",
            Element::Line(_) => "line",
            Element::Arrow(_) => "arrow",
            Element::Text(_) => "text",
            Element::Image(_) => "image",
            Element::RegionCapture(_) => "region-capture",
        }
    }

    /// Whether this element satisfies the commit-time content rules:
    /// freehand needs a point, text needs non-blank content.
    pub fn has_content(&self) -> bool {
        match self {
            Element::Freehand(f) => !f.is_empty(),
            Element::Text(t) => !t.is_blank(),
            _ => true,
        }
    }

    /// Whether the two defining points coincide (a click without drag).
    pub fn is_degenerate(&self) -> bool {
        match self {
            Element::Rectangle(r) => r.start == r.end,
            Element::Circle(c) => c.start == c.end,
            Element::Line(l) => l.start == l.end,
            Element::Arrow(a) => a.start == a.end,
            Element::Image(i) | Element::RegionCapture(i) => i.width <= 0.0 || i.height <= 0.0,
            Element::Freehand(_) | Element::Text(_) => false,
        }
    }

    /// Give this element a fresh identifier.
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        match self {
            Element::Freehand(e) => e.id = new_id,
            Element::Rectangle(e) => e.id = new_id,
            Element::Circle(e) => e.id = new_id,
            Element::Line(e) => e.id = new_id,
            Element::Arrow(e) => e.id = new_id,
            Element::Text(e) => e.id = new_id,
            Element::Image(e) | Element::RegionCapture(e) => e.id = new_id,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Element::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Element::Image(i) | Element::RegionCapture(i) => Some(i),
            _ => None,
        }
    }
}
