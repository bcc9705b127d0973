//! Drawing tools and the in-progress element they build.

use crate::shapes::{Arrow, Circle, Element, ElementStyle, Freehand, Line, Rectangle, normalized_rect};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Freehand,
    Rectangle,
    Circle,
    Line,
    Arrow,
    Text,
    RegionCapture,
}

impl ToolKind {
    /// Whether a drag with this tool produces a new element.
    pub fn draws_element(&self) -> bool {
        matches!(
            self,
            ToolKind::Freehand
                | ToolKind::Rectangle
                | ToolKind::Circle
                | ToolKind::Line
                | ToolKind::Arrow
        )
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// Tool is actively being used (e.g., drawing a shape).
    Active {
        /// Starting point of the interaction.
        start: Point,
        /// Current point of the interaction.
        current: Point,
    },
}

/// Manages the current tool and its state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Accumulated points for freehand drawing.
    freehand_points: Vec<Point>,
    /// Current style to apply to new elements.
    pub current_style: ElementStyle,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool, abandoning any interaction in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.cancel();
    }

    /// Begin a tool interaction.
    pub fn begin(&mut self, point: Point) {
        self.freehand_points.clear();
        if self.current_tool == ToolKind::Freehand {
            self.freehand_points.push(point);
        }
        self.state = ToolState::Active {
            start: point,
            current: point,
        };
    }

    /// Update the current interaction.
    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { current, .. } = &mut self.state {
            *current = point;
            if self.current_tool == ToolKind::Freehand {
                self.push_freehand_point(point);
            }
        }
    }

    fn push_freehand_point(&mut self, point: Point) {
        if self.freehand_points.last() != Some(&point) {
            self.freehand_points.push(point);
        }
    }

    /// End the current interaction and return any created element.
    ///
    /// A click without a drag produces nothing for two-point tools.
    pub fn end(&mut self, point: Point) -> Option<Element> {
        let ToolState::Active { start, .. } = self.state else {
            return None;
        };
        if self.current_tool == ToolKind::Freehand {
            self.push_freehand_point(point);
        }
        let element = self.build(start, point).filter(|e| !e.is_degenerate());
        self.cancel();
        element
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.freehand_points.clear();
    }

    /// Check if a tool interaction is active.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// The dragged rectangle of the active interaction.
    pub fn drag_rect(&self) -> Option<Rect> {
        match self.state {
            ToolState::Active { start, current } => Some(normalized_rect(start, current)),
            ToolState::Idle => None,
        }
    }

    /// Get the preview element for the current interaction.
    pub fn preview_element(&self) -> Option<Element> {
        match self.state {
            ToolState::Active { start, current } => self.build(start, current),
            ToolState::Idle => None,
        }
    }

    /// Get the accumulated freehand points.
    pub fn freehand_points(&self) -> &[Point] {
        &self.freehand_points
    }

    fn build(&self, start: Point, end: Point) -> Option<Element> {
        let style = self.current_style.clone();
        match self.current_tool {
            ToolKind::Rectangle => Some(Element::Rectangle(Rectangle::new(start, end).with_style(style))),
            ToolKind::Circle => Some(Element::Circle(Circle::new(start, end).with_style(style))),
            ToolKind::Line => Some(Element::Line(Line::new(start, end).with_style(style))),
            ToolKind::Arrow => Some(Element::Arrow(Arrow::new(start, end).with_style(style))),
            ToolKind::Freehand => {
                if self.freehand_points.is_empty() {
                    return None;
                }
                Some(Element::Freehand(
                    Freehand::from_points(self.freehand_points.clone()).with_style(style),
                ))
            }
            ToolKind::Select | ToolKind::Text | ToolKind::RegionCapture => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Select);

        tm.set_tool(ToolKind::Rectangle);
        assert_eq!(tm.current_tool, ToolKind::Rectangle);
    }

    #[test]
    fn test_tool_interaction() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Rectangle);

        assert!(!tm.is_active());

        tm.begin(Point::new(0.0, 0.0));
        assert!(tm.is_active());

        tm.update(Point::new(50.0, 50.0));
        assert!(tm.preview_element().is_some());

        let element = tm.end(Point::new(100.0, 100.0));
        assert!(matches!(element, Some(Element::Rectangle(_))));
        assert!(!tm.is_active());
    }

    #[test]
    fn test_click_without_drag_dropped() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Line);
        tm.begin(Point::new(5.0, 5.0));
        assert!(tm.end(Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_freehand_points() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Freehand);
        tm.begin(Point::new(0.0, 0.0));
        tm.update(Point::new(5.0, 5.0));
        tm.update(Point::new(5.0, 5.0));
        tm.update(Point::new(10.0, 0.0));
        let Some(Element::Freehand(f)) = tm.end(Point::new(10.0, 0.0)) else {
            panic!("expected freehand");
        };
        assert_eq!(
            f.points,
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(10.0, 0.0)]
        );
    }

    #[test]
    fn test_cancel_interaction() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Rectangle);

        tm.begin(Point::new(0.0, 0.0));
        assert!(tm.is_active());

        tm.cancel();
        assert!(!tm.is_active());
        assert!(tm.end(Point::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_select_tool_no_element() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Select);

        tm.begin(Point::new(0.0, 0.0));
        assert!(tm.end(Point::new(100.0, 100.0)).is_none());
        assert!(!tm.is_active());
    }
}
