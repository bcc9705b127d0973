//! Renderer trait abstraction.

use annotink_core::editor::Editor;
use annotink_core::hit_test::HitTester;
use annotink_core::scene::Scene;
use annotink_core::selection::Selection;
use annotink_core::shapes::{Color, Element, ElementId, TextMeasure};
use kurbo::Rect;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Everything needed to draw one frame.
pub struct RenderContext<'a> {
    /// The committed elements, drawn in list order.
    pub scene: &'a Scene,
    /// Current selection (decorated with a dashed box, plus handles when single).
    pub selection: &'a Selection,
    /// The element being drawn, if a draw gesture is in progress.
    pub pending: Option<Element>,
    /// Element whose committed text the overlay is currently showing.
    pub editing_id: Option<ElementId>,
    /// Region being dragged in capture mode.
    pub capture_rect: Option<Rect>,
    /// Geometry for selection boxes and handles.
    pub hit_tester: HitTester,
    /// Text metrics for selection boxes and handles. Falls back to the
    /// renderer's own when unset.
    pub measure: Option<&'a dyn TextMeasure>,
    /// Background color.
    pub background_color: Color,
    /// Selection highlight color.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(scene: &'a Scene, selection: &'a Selection) -> Self {
        Self {
            scene,
            selection,
            pending: None,
            editing_id: None,
            capture_rect: None,
            hit_tester: HitTester::default(),
            measure: None,
            background_color: Color::white(),
            selection_color: Color::new(59, 130, 246, 255), // Blue
        }
    }

    /// Snapshot the drawable state of an editor.
    pub fn from_editor(editor: &'a Editor) -> Self {
        Self::new(editor.scene(), editor.selection())
            .with_pending(editor.pending_element())
            .with_editing(editor.overlay().editing_id())
            .with_capture_rect(editor.capture_rect())
            .with_hit_tester(*editor.hit_tester())
            .with_measure(editor.measure())
    }

    /// Set the in-progress element.
    pub fn with_pending(mut self, pending: Option<Element>) -> Self {
        self.pending = pending;
        self
    }

    /// Set the element being edited (will be skipped in render).
    pub fn with_editing(mut self, id: Option<ElementId>) -> Self {
        self.editing_id = id;
        self
    }

    /// Set the capture-mode rectangle.
    pub fn with_capture_rect(mut self, rect: Option<Rect>) -> Self {
        self.capture_rect = rect;
        self
    }

    pub fn with_hit_tester(mut self, hit_tester: HitTester) -> Self {
        self.hit_tester = hit_tester;
        self
    }

    /// Size text boxes with `measure`, so decorations match hit-testing.
    pub fn with_measure(mut self, measure: &'a dyn TextMeasure) -> Self {
        self.measure = Some(measure);
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Clear the surface and draw a full frame.
    ///
    /// Safe to call at any time; nothing from a previous frame survives.
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
