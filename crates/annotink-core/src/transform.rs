//! Move, resize and container-rescale transforms.
//!
//! Gestures keep an untouched copy of the pre-gesture geometry and derive
//! every intermediate state from it, so repeated pointer moves never
//! accumulate rounding drift.

use crate::hit_test::Corner;
use crate::shapes::{Element, ElementId, TextMeasure};
use kurbo::{Point, Vec2};

/// A drag of one or more elements.
#[derive(Debug, Clone)]
pub struct MoveGesture {
    origin: Point,
    originals: Vec<Element>,
}

impl MoveGesture {
    /// Start moving `originals` from the pointer position `origin`.
    pub fn new(origin: Point, originals: Vec<Element>) -> Self {
        Self { origin, originals }
    }

    /// Ids being moved.
    pub fn ids(&self) -> Vec<ElementId> {
        self.originals.iter().map(Element::id).collect()
    }

    /// Pre-gesture copies of the moved elements.
    pub fn originals(&self) -> &[Element] {
        &self.originals
    }

    /// Offset of `pointer` from the gesture start.
    pub fn delta(&self, pointer: Point) -> Vec2 {
        pointer - self.origin
    }

    /// The moved elements for the current pointer position.
    pub fn apply(&self, pointer: Point) -> Vec<Element> {
        let delta = self.delta(pointer);
        self.originals
            .iter()
            .map(|original| {
                let mut moved = original.clone();
                moved.translate(delta);
                moved
            })
            .collect()
    }
}

/// A corner drag on the single active element.
#[derive(Debug, Clone)]
pub struct ResizeGesture {
    corner: Corner,
    origin: Point,
    original: Element,
    min_image_size: f64,
}

impl ResizeGesture {
    /// Start resizing `original` from the handle pressed at `origin`.
    pub fn new(corner: Corner, origin: Point, original: Element, min_image_size: f64) -> Self {
        Self {
            corner,
            origin,
            original,
            min_image_size,
        }
    }

    /// The handle that started the gesture.
    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn id(&self) -> ElementId {
        self.original.id()
    }

    /// Pre-gesture copy of the element.
    pub fn original(&self) -> &Element {
        &self.original
    }

    /// The resized element for the current pointer position.
    ///
    /// A pointer resting at the press position leaves the element untouched.
    pub fn apply(&self, pointer: Point, measure: &dyn TextMeasure) -> Element {
        let mut resized = self.original.clone();
        if pointer == self.origin {
            return resized;
        }
        match &mut resized {
            Element::Rectangle(r) => r.end = pointer,
            Element::Circle(c) => c.end = pointer,
            Element::Line(l) => l.end = pointer,
            Element::Arrow(a) => a.end = pointer,
            Element::Image(i) | Element::RegionCapture(i) => {
                i.width = (pointer.x - i.start.x).max(self.min_image_size);
                i.height = (pointer.y - i.start.y).max(self.min_image_size);
            }
            Element::Freehand(f) => {
                let bounds = self.original.bounds(measure);
                let origin = Point::new(bounds.x0, bounds.y0);
                let sx = axis_scale(pointer.x - origin.x, bounds.width());
                let sy = axis_scale(pointer.y - origin.y, bounds.height());
                for point in &mut f.points {
                    point.x = origin.x + (point.x - origin.x) * sx;
                    point.y = origin.y + (point.y - origin.y) * sy;
                }
            }
            // Text has no resize semantics.
            Element::Text(_) => {}
        }
        resized
    }
}

/// Scale factor along one axis. A zero-size axis is left unscaled.
fn axis_scale(extent: f64, original: f64) -> f64 {
    if original.abs() < f64::EPSILON {
        return 1.0;
    }
    (extent / original).max(0.0)
}

/// Multiply the vertical geometry of every element by `factor`.
pub fn rescale_vertical(elements: &mut [Element], factor: f64) {
    for element in elements {
        element.scale_y(factor);
    }
}

/// Tracks the surface height and decides when a resize warrants rescaling.
#[derive(Debug, Clone)]
pub struct ContainerRescaler {
    reference_height: Option<f64>,
    threshold: f64,
    in_flight: bool,
}

impl ContainerRescaler {
    pub fn new(threshold: f64) -> Self {
        Self {
            reference_height: None,
            threshold,
            in_flight: false,
        }
    }

    /// Height the current geometry is laid out for.
    pub fn reference_height(&self) -> Option<f64> {
        self.reference_height
    }

    /// Forget the reference so the next report only records it.
    pub fn reset(&mut self, height: Option<f64>) {
        self.reference_height = height;
        self.in_flight = false;
    }

    /// Report a new surface height.
    ///
    /// Returns the factor to scale by when the change exceeds the threshold.
    /// While a rescale is in flight further reports are ignored until
    /// [`finish`](Self::finish) is called.
    pub fn begin(&mut self, new_height: f64) -> Option<f64> {
        if self.in_flight || !new_height.is_finite() || new_height <= 0.0 {
            return None;
        }
        let Some(old_height) = self.reference_height.filter(|h| *h > 0.0) else {
            self.reference_height = Some(new_height);
            return None;
        };
        if (new_height - old_height).abs() <= self.threshold {
            return None;
        }
        self.in_flight = true;
        self.reference_height = Some(new_height);
        Some(new_height / old_height)
    }

    /// Mark the in-flight rescale as done.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}
