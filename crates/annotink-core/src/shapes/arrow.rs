//! Arrow element and arrowhead geometry.

use super::{
    ElementId, ElementStyle, ElementTrait, GroupId, TextMeasure, normalized_rect, point_is_finite,
};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uuid::Uuid;

/// Length of each arrowhead stroke in pixels.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;
/// Angle between the shaft and each arrowhead stroke (30°).
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;

/// A straight arrow pointing from `start` to `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub(crate) id: ElementId,
    /// Tail.
    pub start: Point,
    /// Tip (the arrowhead is drawn here).
    pub end: Point,
    /// Style properties.
    pub style: ElementStyle,
    /// Rigid group membership.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl Arrow {
    /// Create a new arrow.
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

    /// Endpoints of the two arrowhead strokes.
    pub fn head(&self) -> Option<(Point, Point)> {
        arrow_head(self.start, self.end, ARROW_HEAD_LENGTH)
    }
}

/// Compute the two arrowhead stroke endpoints at `end`, angled ±30° back
/// along the shaft. Returns `None` for a zero-length shaft.
pub fn arrow_head(start: Point, end: Point, length: f64) -> Option<(Point, Point)> {
    if start == end {
        return None;
    }
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let left = Point::new(
        end.x - length * (angle - ARROW_HEAD_ANGLE).cos(),
        end.y - length * (angle - ARROW_HEAD_ANGLE).sin(),
    );
    let right = Point::new(
        end.x - length * (angle + ARROW_HEAD_ANGLE).cos(),
        end.y - length * (angle + ARROW_HEAD_ANGLE).sin(),
    );
    Some((left, right))
}

impl ElementTrait for Arrow {
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
        normalized_rect(self.start, self.end)
    }

    fn is_finite(&self) -> bool {
        point_is_finite(self.start) && point_is_finite(self.end)
    }
}
