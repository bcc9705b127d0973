//! Text element and text measurement.

use super::{ElementId, ElementStyle, ElementTrait, GroupId, point_is_finite};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Measures the advance width of a single line of text.
///
/// The core uses [`ApproxTextMeasure`]; a renderer with real font data
/// can supply an exact implementation so hit boxes match drawn glyphs.
pub trait TextMeasure {
    /// Width in pixels of `line` at `font_size`.
    fn line_width(&self, line: &str, font_size: f64) -> f64;
}

/// Character-count based width estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl ApproxTextMeasure {
    /// Average glyph advance as a fraction of the font size.
    pub const CHAR_WIDTH_FACTOR: f64 = 0.55;
}

impl TextMeasure for ApproxTextMeasure {
    fn line_width(&self, line: &str, font_size: f64) -> f64 {
        line.chars().count() as f64 * font_size * Self::CHAR_WIDTH_FACTOR
    }
}

/// A multi-line text element anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub(crate) id: ElementId,
    /// Top-left corner of the first line.
    pub start: Point,
    /// The text content; `\n` separates lines.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Style properties (stroke color is the text color).
    pub style: ElementStyle,
    /// Rigid group membership.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl Text {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Create a new text element.
    pub fn new(start: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ElementStyle::default(),
            group_id: None,
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    /// Lines of the content, including a trailing empty line after a final `\n`.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    /// Number of lines (at least one).
    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// Vertical distance between consecutive baselines.
    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT_FACTOR
    }

    /// True when the content is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Measured size: widest line by total line height.
    pub fn size(&self, measure: &dyn TextMeasure) -> (f64, f64) {
        let width = self
            .lines()
            .map(|line| measure.line_width(line, self.font_size))
            .fold(0.0, f64::max);
        let height = self.line_count() as f64 * self.line_height();
        (width, height)
    }
}

impl ElementTrait for Text {
    fn id(&self) -> ElementId {
        self.id
    }

    fn style(&self) -> &ElementStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ElementStyle {
        &mut self.style
    }

    fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    fn set_group_id(&mut self, group_id: Option<GroupId>) {
        self.group_id = group_id;
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
    }

    fn scale_y(&mut self, factor: f64) {
        self.start.y *= factor;
    }

    fn bounds(&self, measure: &dyn TextMeasure) -> Rect {
        let (width, height) = self.size(measure);
        Rect::new(
            self.start.x,
            self.start.y,
            self.start.x + width,
            self.start.y + height,
        )
    }

    fn is_finite(&self) -> bool {
        point_is_finite(self.start) && self.font_size.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_creation() {
        let text = Text::new(Point::new(100.0, 100.0), "Hello".to_string());
        assert_eq!(text.content, "Hello");
        assert!((text.font_size - Text::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_multiline_bounds() {
        let text = Text::new(Point::new(10.0, 20.0), "ab\nabcd".to_string()).with_font_size(10.0);
        let bounds = text.bounds(&ApproxTextMeasure);
        // Widest line has 4 chars.
        assert!((bounds.width() - 4.0 * 10.0 * ApproxTextMeasure::CHAR_WIDTH_FACTOR).abs() < 1e-9);
        assert!((bounds.height() - 2.0 * 10.0 * LINE_HEIGHT_FACTOR).abs() < 1e-9);
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trailing_newline_counts_as_line() {
        let text = Text::new(Point::ZERO, "one\n".to_string());
        assert_eq!(text.line_count(), 2);
    }

    #[test]
    fn test_blank() {
        assert!(Text::new(Point::ZERO, " \t\n".to_string()).is_blank());
        assert!(!Text::new(Point::ZERO, " x ".to_string()).is_blank());
    }
}
