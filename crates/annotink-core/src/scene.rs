//! The scene: an ordered list of elements (z-order = list order).

use crate::shapes::{Color, Element, ElementId, GroupId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Element model errors.
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("Element not found: {0}")]
    NotFound(ElementId),
    #[error("Element {0} has non-finite geometry")]
    NonFiniteGeometry(ElementId),
    #[error("Duplicate element id: {0}")]
    DuplicateId(ElementId),
}

/// Result type for element model operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// A partial update applied through [`Scene::update`].
///
/// Fields left as `None` are untouched. Geometry fields only apply to the
/// kinds that carry them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub stroke_color: Option<Color>,
    /// `Some(None)` removes the fill.
    pub fill_color: Option<Option<Color>>,
    pub line_width: Option<f64>,
    pub start: Option<Point>,
    pub end: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
}

impl ElementPatch {
    pub fn stroke_color(mut self, color: Color) -> Self {
        self.stroke_color = Some(color);
        self
    }

    pub fn fill_color(mut self, color: Option<Color>) -> Self {
        self.fill_color = Some(color);
        self
    }

    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn start(mut self, start: Point) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: Point) -> Self {
        self.end = Some(end);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    fn apply(self, element: &mut Element) {
        let style = element.style_mut();
        if let Some(color) = self.stroke_color {
            style.stroke_color = color;
        }
        if let Some(fill) = self.fill_color {
            style.fill_color = fill;
        }
        if let Some(width) = self.line_width {
            style.line_width = width;
        }

        match element {
            Element::Rectangle(e) => apply_endpoints(&mut e.start, &mut e.end, self.start, self.end),
            Element::Circle(e) => apply_endpoints(&mut e.start, &mut e.end, self.start, self.end),
            Element::Line(e) => apply_endpoints(&mut e.start, &mut e.end, self.start, self.end),
            Element::Arrow(e) => apply_endpoints(&mut e.start, &mut e.end, self.start, self.end),
            Element::Text(t) => {
                if let Some(start) = self.start {
                    t.start = start;
                }
                if let Some(content) = self.content {
                    t.content = content;
                }
                if let Some(size) = self.font_size {
                    t.font_size = size;
                }
            }
            Element::Image(i) | Element::RegionCapture(i) => {
                if let Some(start) = self.start {
                    i.start = start;
                }
                if let Some(width) = self.width {
                    i.width = width;
                }
                if let Some(height) = self.height {
                    i.height = height;
                }
            }
            Element::Freehand(_) => {}
        }
    }
}

fn apply_endpoints(start: &mut Point, end: &mut Point, new_start: Option<Point>, new_end: Option<Point>) {
    if let Some(p) = new_start {
        *start = p;
    }
    if let Some(p) = new_end {
        *end = p;
    }
}

/// What an update did to the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The element was changed in place.
    Updated,
    /// The element became invalid (blank text) and was removed.
    Removed,
}

/// An ordered list of elements plus a display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Display name.
    pub name: String,
    elements: Vec<Element>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Elements back to front.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get an element by id.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Position of an element in z-order.
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    /// All element ids, back to front.
    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(Element::id).collect()
    }

    /// Add a finished element on top of the scene.
    ///
    /// Returns `Ok(None)` without touching the scene when the element breaks a
    /// content rule (empty freehand, blank text).
    pub fn commit(&mut self, mut element: Element) -> SceneResult<Option<ElementId>> {
        if !element.has_content() {
            log::debug!("Dropping empty {} element", element.kind_name());
            return Ok(None);
        }
        let id = element.id();
        if !element.is_finite() {
            return Err(SceneError::NonFiniteGeometry(id));
        }
        if self.contains(id) {
            return Err(SceneError::DuplicateId(id));
        }
        if let Some(group_id) = element.group_id() {
            // A group needs a second member already in the scene.
            if !self.elements.iter().any(|e| e.group_id() == Some(group_id)) {
                element.set_group_id(None);
            }
        }
        log::debug!("Committed {} element {}", element.kind_name(), id);
        self.elements.push(element);
        Ok(Some(id))
    }

    /// Remove every element in `ids`. Returns the number removed.
    pub fn remove(&mut self, ids: &[ElementId]) -> usize {
        let ids: HashSet<ElementId> = ids.iter().copied().collect();
        let before = self.elements.len();
        self.elements.retain(|e| !ids.contains(&e.id()));
        let removed = before - self.elements.len();
        if removed > 0 {
            log::debug!("Removed {} element(s)", removed);
            self.normalize_groups();
        }
        removed
    }

    /// Apply a patch to one element, enforcing the element invariants.
    pub fn update(&mut self, id: ElementId, patch: ElementPatch) -> SceneResult<UpdateOutcome> {
        self.update_with(id, |element| patch.apply(element))
    }

    /// Mutate one element through a closure, then re-check its invariants.
    ///
    /// Non-finite results are rolled back. Text left blank is removed.
    pub fn update_with(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut Element),
    ) -> SceneResult<UpdateOutcome> {
        let index = self.index_of(id).ok_or(SceneError::NotFound(id))?;
        let previous = self.elements[index].clone();
        let element = &mut self.elements[index];
        f(element);

        if !element.is_finite() {
            *element = previous;
            return Err(SceneError::NonFiniteGeometry(id));
        }
        if !element.has_content() {
            self.elements.remove(index);
            self.normalize_groups();
            log::debug!("Removed {} after it lost its content", id);
            return Ok(UpdateOutcome::Removed);
        }
        Ok(UpdateOutcome::Updated)
    }

    /// Replace an element with a modified copy carrying the same id.
    pub fn replace(&mut self, element: Element) -> SceneResult<()> {
        let id = element.id();
        let index = self.index_of(id).ok_or(SceneError::NotFound(id))?;
        if !element.is_finite() {
            return Err(SceneError::NonFiniteGeometry(id));
        }
        self.elements[index] = element;
        Ok(())
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        log::debug!("Cleared {} element(s)", self.elements.len());
        self.elements.clear();
    }

    /// Swap in a whole element list (history restore, snapshot load).
    pub fn restore(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        self.normalize_groups();
    }

    /// Move the given elements to the top, keeping their relative order.
    pub fn bring_to_front(&mut self, ids: &[ElementId]) -> bool {
        let (mut picked, rest) = self.partition(ids);
        if picked.is_empty() {
            return false;
        }
        let mut elements = rest;
        elements.append(&mut picked);
        self.elements = elements;
        true
    }

    /// Move the given elements to the bottom, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &[ElementId]) -> bool {
        let (mut picked, mut rest) = self.partition(ids);
        if picked.is_empty() {
            return false;
        }
        picked.append(&mut rest);
        self.elements = picked;
        true
    }

    fn partition(&mut self, ids: &[ElementId]) -> (Vec<Element>, Vec<Element>) {
        let ids: HashSet<ElementId> = ids.iter().copied().collect();
        std::mem::take(&mut self.elements)
            .into_iter()
            .partition(|e| ids.contains(&e.id()))
    }

    /// Ids of every element in a group, in z-order.
    pub fn group_members(&self, group_id: GroupId) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.group_id() == Some(group_id))
            .map(Element::id)
            .collect()
    }

    /// Set or clear the group of the given elements.
    pub fn set_group(&mut self, ids: &[ElementId], group_id: Option<GroupId>) {
        let ids: HashSet<ElementId> = ids.iter().copied().collect();
        for element in &mut self.elements {
            if ids.contains(&element.id()) {
                element.set_group_id(group_id);
            }
        }
    }

    /// Dissolve any group with fewer than two members.
    pub fn normalize_groups(&mut self) {
        let mut counts: HashMap<GroupId, usize> = HashMap::new();
        for group_id in self.elements.iter().filter_map(Element::group_id) {
            *counts.entry(group_id).or_default() += 1;
        }
        for element in &mut self.elements {
            if let Some(group_id) = element.group_id() {
                if counts.get(&group_id).copied().unwrap_or(0) < 2 {
                    element.set_group_id(None);
                }
            }
        }
    }
}
