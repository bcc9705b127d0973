//! In-place text authoring, kept out of the scene until committed.

use crate::scene::{ElementPatch, Scene, SceneResult, UpdateOutcome};
use crate::shapes::{Element, ElementId, ElementStyle, Text};
use kurbo::Point;

/// What a text edit session is bound to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditTarget {
    /// An element already in the scene.
    Existing(ElementId),
    /// A new text element at this top-left position.
    New(Point),
}

/// Result of committing an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCommit {
    /// A new text element was added.
    Created(ElementId),
    /// An existing element's content changed.
    Updated(ElementId),
    /// The existing element was left blank and removed.
    Deleted(ElementId),
    /// Nothing changed in the scene (blank new text, or no session).
    Discarded,
}

impl TextCommit {
    /// Whether the scene was mutated.
    pub fn changed_scene(&self) -> bool {
        !matches!(self, TextCommit::Discarded)
    }
}

#[derive(Debug, Clone)]
struct EditSession {
    target: EditTarget,
    text: String,
    font_size: f64,
    style: ElementStyle,
}

/// Transient editing surface bound to at most one text element.
#[derive(Debug, Clone, Default)]
pub struct TextEditOverlay {
    session: Option<EditSession>,
}

impl TextEditOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the overlay on an existing text element.
    ///
    /// Returns false when `id` is not a text element of `scene`.
    pub fn begin_existing(&mut self, scene: &Scene, id: ElementId) -> bool {
        let Some(text) = scene.get(id).and_then(Element::as_text) else {
            return false;
        };
        self.session = Some(EditSession {
            target: EditTarget::Existing(id),
            text: text.content.clone(),
            font_size: text.font_size,
            style: text.style.clone(),
        });
        true
    }

    /// Open the overlay for a new text element at `position`.
    pub fn begin_new(&mut self, position: Point, font_size: f64, style: ElementStyle) {
        self.session = Some(EditSession {
            target: EditTarget::New(position),
            text: String::new(),
            font_size,
            style,
        });
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn target(&self) -> Option<EditTarget> {
        self.session.as_ref().map(|s| s.target)
    }

    /// The committed element hidden while the overlay shows its live text.
    pub fn editing_id(&self) -> Option<ElementId> {
        match self.target()? {
            EditTarget::Existing(id) => Some(id),
            EditTarget::New(_) => None,
        }
    }

    /// Live text in the overlay.
    pub fn text(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.text.as_str())
    }

    /// Where the overlay sits and how large its text is.
    pub fn placement(&self, scene: &Scene) -> Option<(Point, f64)> {
        let session = self.session.as_ref()?;
        let position = match session.target {
            EditTarget::New(position) => position,
            EditTarget::Existing(id) => scene.get(id).and_then(Element::as_text)?.start,
        };
        Some((position, session.font_size))
    }

    /// Replace the live text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Some(session) = &mut self.session {
            session.text = text.into();
        }
    }

    /// Append typed text at the end.
    pub fn insert(&mut self, text: &str) {
        if let Some(session) = &mut self.session {
            session.text.push_str(text);
        }
    }

    /// Delete the last character.
    pub fn backspace(&mut self) {
        if let Some(session) = &mut self.session {
            session.text.pop();
        }
    }

    /// Close the overlay and discard the live text.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    /// Close the overlay and write its text into `scene`.
    ///
    /// Blank text on an existing element deletes it. Blank new text is
    /// discarded.
    pub fn commit(&mut self, scene: &mut Scene) -> SceneResult<TextCommit> {
        let Some(session) = self.session.take() else {
            return Ok(TextCommit::Discarded);
        };
        match session.target {
            EditTarget::Existing(id) => {
                let unchanged = scene
                    .get(id)
                    .and_then(Element::as_text)
                    .is_some_and(|t| t.content == session.text);
                if unchanged {
                    return Ok(TextCommit::Discarded);
                }
                match scene.update(id, ElementPatch::default().content(session.text))? {
                    UpdateOutcome::Updated => Ok(TextCommit::Updated(id)),
                    UpdateOutcome::Removed => Ok(TextCommit::Deleted(id)),
                }
            }
            EditTarget::New(position) => {
                let text = Text::new(position, session.text)
                    .with_font_size(session.font_size)
                    .with_style(session.style);
                Ok(scene
                    .commit(Element::Text(text))?
                    .map_or(TextCommit::Discarded, TextCommit::Created))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_text(content: &str) -> (Scene, ElementId) {
        let mut scene = Scene::default();
        let id = scene
            .commit(Element::Text(Text::new(Point::new(5.0, 5.0), content.to_string())))
            .unwrap()
            .unwrap();
        (scene, id)
    }

    #[test]
    fn test_new_text_commit() {
        let mut scene = Scene::default();
        let mut overlay = TextEditOverlay::new();
        overlay.begin_new(Point::new(10.0, 20.0), 24.0, ElementStyle::default());
        overlay.insert("Hello");
        overlay.insert("\nWorld");

        let TextCommit::Created(id) = overlay.commit(&mut scene).unwrap() else {
            panic!("expected a created element");
        };
        let text = scene.get(id).and_then(Element::as_text).unwrap();
        assert_eq!(text.content, "Hello\nWorld");
        assert!((text.font_size - 24.0).abs() < f64::EPSILON);
        assert!(!overlay.is_active());
    }

    #[test]
    fn test_blank_new_text_discarded() {
        let mut scene = Scene::default();
        let mut overlay = TextEditOverlay::new();
        overlay.begin_new(Point::ZERO, 20.0, ElementStyle::default());
        overlay.set_text("   ");
        assert_eq!(overlay.commit(&mut scene).unwrap(), TextCommit::Discarded);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_existing_blank_deletes() {
        let (mut scene, id) = scene_with_text("note");
        let mut overlay = TextEditOverlay::new();
        assert!(overlay.begin_existing(&scene, id));
        assert_eq!(overlay.editing_id(), Some(id));
        assert_eq!(overlay.text(), Some("note"));

        overlay.set_text(" \n ");
        assert_eq!(overlay.commit(&mut scene).unwrap(), TextCommit::Deleted(id));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_existing_update() {
        let (mut scene, id) = scene_with_text("note");
        let mut overlay = TextEditOverlay::new();
        overlay.begin_existing(&scene, id);
        overlay.backspace();
        assert_eq!(overlay.commit(&mut scene).unwrap(), TextCommit::Updated(id));
        assert_eq!(scene.get(id).and_then(Element::as_text).unwrap().content, "not");
    }

    #[test]
    fn test_unchanged_commit_is_discarded() {
        let (mut scene, id) = scene_with_text("note");
        let mut overlay = TextEditOverlay::new();
        overlay.begin_existing(&scene, id);
        assert_eq!(overlay.commit(&mut scene).unwrap(), TextCommit::Discarded);
    }

    #[test]
    fn test_cancel_leaves_scene() {
        let (mut scene, id) = scene_with_text("note");
        let before = scene.clone();
        let mut overlay = TextEditOverlay::new();
        overlay.begin_existing(&scene, id);
        overlay.set_text("");
        overlay.cancel();
        assert!(!overlay.is_active());
        assert_eq!(overlay.commit(&mut scene).unwrap(), TextCommit::Discarded);
        assert_eq!(scene, before);
    }

    #[test]
    fn test_begin_existing_rejects_non_text() {
        let mut scene = Scene::default();
        let id = scene
            .commit(Element::Rectangle(crate::shapes::Rectangle::new(
                Point::ZERO,
                Point::new(1.0, 1.0),
            )))
            .unwrap()
            .unwrap();
        let mut overlay = TextEditOverlay::new();
        assert!(!overlay.begin_existing(&scene, id));
        assert!(!overlay.is_active());
    }
}
