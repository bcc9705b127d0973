//! Rectangle element.

use super::{
    ElementId, ElementStyle, ElementTrait, GroupId, TextMeasure, normalized_rect, point_is_finite,
};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned rectangle spanned by two corner points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub(crate) id: ElementId,
    /// Corner where the drag started.
    pub start: Point,
    /// Opposite corner.
    pub end: Point,
    /// Style properties.
    pub style: ElementStyle,
    /// Rigid group membership.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ElementStyle::default(),
            group_id: None,
        }
    }

    /// Set the style.
    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    /// The rectangle with normalized min/max corners.
    pub fn as_rect(&self) -> Rect {
        normalized_rect(self.start, self.end)
    }
}

impl ElementTrait for Rectangle {
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
        self.end += delta;
    }

    fn scale_y(&mut self, factor: f64) {
        self.start.y *= factor;
        self.end.y *= factor;
    }

    fn bounds(&self, _measure: &dyn TextMeasure) -> Rect {
        self.as_rect()
    }

    fn is_finite(&self) -> bool {
        point_is_finite(self.start) && point_is_finite(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ApproxTextMeasure;

    #[test]
    fn test_bounds_normalized() {
        let rect = Rectangle::new(Point::new(100.0, 100.0), Point::new(50.0, 20.0));
        let bounds = rect.bounds(&ApproxTextMeasure);
        assert!((bounds.x0 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_translate() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        rect.translate(Vec2::new(5.0, -5.0));
        assert_eq!(rect.start, Point::new(5.0, -5.0));
        assert_eq!(rect.end, Point::new(15.0, 5.0));
    }
}
