//! Circle element.

use super::{ElementId, ElementStyle, ElementTrait, GroupId, TextMeasure, point_is_finite};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle defined by its center (`start`) and a point on its rim (`end`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub(crate) id: ElementId,
    /// Center.
    pub start: Point,
    /// A point on the circumference.
    pub end: Point,
    /// Style properties.
    pub style: ElementStyle,
    /// Rigid group membership.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl Circle {
    /// Create a new circle.
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

    /// Radius = distance from center to the rim point.
    pub fn radius(&self) -> f64 {
        self.start.distance(self.end)
    }
}

impl ElementTrait for Circle {
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
        let r = self.radius();
        Rect::new(
            self.start.x - r,
            self.start.y - r,
            self.start.x + r,
            self.start.y + r,
        )
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
    fn test_radius() {
        let circle = Circle::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((circle.radius() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let circle = Circle::new(Point::new(10.0, 10.0), Point::new(10.0, 20.0));
        let bounds = circle.bounds(&ApproxTextMeasure);
        assert_eq!(bounds, Rect::new(0.0, 0.0, 20.0, 20.0));
    }
}
