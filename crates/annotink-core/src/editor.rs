//! The editor: sole owner of the scene, its history and the selection.
//!
//! Host UI callbacks only dispatch into the operations here. Every
//! committed mutation goes through [`Editor::record`], which pushes exactly
//! one history snapshot and bumps the revision counter auto-save watches.

use crate::capture::{CaptureError, SurfaceCapture};
use crate::config::EditorConfig;
use crate::history::History;
use crate::hit_test::{Corner, HitTester};
use crate::image_import::{ImportError, ImportedImage, decode_import};
use crate::input::{Key, Modifiers};
use crate::scene::{ElementPatch, Scene, SceneError, UpdateOutcome};
use crate::selection::{self, Selection, SelectionError};
use crate::shapes::{
    ApproxTextMeasure, Color, Element, ElementId, ElementStyle, GroupId, Image, TextMeasure,
};
use crate::text_edit::{TextCommit, TextEditOverlay};
use crate::tools::{ToolKind, ToolManager};
use crate::transform::{ContainerRescaler, MoveGesture, ResizeGesture, rescale_vertical};
use kurbo::{Point, Rect};
use thiserror::Error;

/// Errors surfaced by editor operations.
#[derive(Debug, Error, PartialEq)]
pub enum EditorError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// What a pointer-up finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerUpOutcome {
    /// Nothing was committed.
    None,
    /// A drawn element was added.
    Committed(ElementId),
    /// The selection was moved.
    Moved,
    /// The active element was resized.
    Resized(ElementId),
    /// A region was dragged in capture mode; hand it to
    /// [`Editor::commit_capture`] once the surface can be read.
    CaptureRequested(Rect),
}

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Drawing,
    Capturing,
    Moving(MoveGesture),
    Resizing(ResizeGesture),
}

/// Central editor state machine.
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    history: History,
    selection: Selection,
    tools: ToolManager,
    gesture: Gesture,
    overlay: TextEditOverlay,
    rescaler: ContainerRescaler,
    hit_tester: HitTester,
    measure: Box<dyn TextMeasure>,
    revision: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with an empty scene.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_scene(Scene::new("Untitled"), config)
    }

    /// Create an editor around an existing scene (e.g. restored from storage).
    pub fn with_scene(scene: Scene, config: EditorConfig) -> Self {
        let history = History::new(scene.elements().to_vec()).with_limit(config.history_limit);
        let mut tools = ToolManager::new();
        tools.current_style = config.default_style();
        Self {
            hit_tester: HitTester::from_config(&config),
            rescaler: ContainerRescaler::new(config.rescale_threshold),
            config,
            scene,
            history,
            selection: Selection::None,
            tools,
            gesture: Gesture::Idle,
            overlay: TextEditOverlay::new(),
            measure: Box::new(ApproxTextMeasure),
            revision: 0,
        }
    }

    /// Replace the text measurement used for hit boxes.
    pub fn set_text_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.measure = measure;
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn hit_tester(&self) -> &HitTester {
        &self.hit_tester
    }

    pub fn overlay(&self) -> &TextEditOverlay {
        &self.overlay
    }

    /// Mutable access for feeding live text into the overlay.
    pub fn overlay_mut(&mut self) -> &mut TextEditOverlay {
        &mut self.overlay
    }

    /// Counter bumped on every scene mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    /// Switch tools. Any gesture in progress is cancelled.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.cancel_gesture();
        self.tools.set_tool(tool);
    }

    /// Style applied to newly drawn elements.
    pub fn style(&self) -> &ElementStyle {
        &self.tools.current_style
    }

    pub fn set_style(&mut self, style: ElementStyle) {
        self.tools.current_style = style;
    }

    /// The element being drawn, for the renderer.
    pub fn pending_element(&self) -> Option<Element> {
        match self.gesture {
            Gesture::Drawing => self.tools.preview_element(),
            _ => None,
        }
    }

    /// The region being dragged in capture mode.
    pub fn capture_rect(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::Capturing => self.tools.drag_rect(),
            _ => None,
        }
    }

    /// Whether a draw, move, resize or capture drag is in progress.
    pub fn is_gesture_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Handle squares of the active element, if exactly one is selected.
    pub fn handle_rects(&self) -> Option<[(Corner, Rect); 4]> {
        let element = self.scene.get(self.selection.active()?)?;
        Some(self.hit_tester.handle_rects(element, self.measure()))
    }

    /// Topmost element under `point`.
    pub fn hit_test(&self, point: Point) -> Option<ElementId> {
        self.hit_tester
            .hit_test(point, self.scene.elements(), self.measure())
    }

    fn record(&mut self) {
        self.history.commit(self.scene.elements());
        self.selection.retain_existing(&self.scene);
        self.revision += 1;
    }

    // Pointer input

    /// Pointer pressed at `point`.
    pub fn pointer_down(&mut self, point: Point, modifiers: Modifiers) {
        if self.overlay.is_active() {
            // The click only closes the overlay.
            self.commit_text_edit();
            return;
        }
        if self.is_gesture_active() {
            return;
        }

        match self.tools.current_tool {
            ToolKind::Select => self.select_pointer_down(point, modifiers),
            ToolKind::Text => {
                if !self.begin_text_edit_at(point) {
                    self.overlay
                        .begin_new(point, self.config.font_size, self.tools.current_style.clone());
                }
            }
            ToolKind::RegionCapture => {
                self.tools.begin(point);
                self.gesture = Gesture::Capturing;
            }
            _ => {
                self.tools.begin(point);
                self.gesture = Gesture::Drawing;
            }
        }
    }

    fn select_pointer_down(&mut self, point: Point, modifiers: Modifiers) {
        if let Some(id) = self.selection.active() {
            if let Some(element) = self.scene.get(id) {
                if let Some(corner) = self.hit_tester.handle_test(point, element, self.measure()) {
                    self.gesture = Gesture::Resizing(ResizeGesture::new(
                        corner,
                        point,
                        element.clone(),
                        self.config.min_image_size,
                    ));
                    return;
                }
            }
        }

        let hit = self.hit_test(point);
        if modifiers.action_mod() {
            selection::select_at(&mut self.selection, &self.scene, hit, true);
            return;
        }

        let Some(id) = hit else {
            self.selection.clear();
            return;
        };
        // Pressing on an already selected element drags the whole selection.
        if !self.selection.contains(id) {
            selection::select_at(&mut self.selection, &self.scene, Some(id), false);
        }
        let originals = self
            .selection
            .ids()
            .into_iter()
            .filter_map(|id| self.scene.get(id).cloned())
            .collect();
        self.gesture = Gesture::Moving(MoveGesture::new(point, originals));
    }

    /// Pointer moved to `point`.
    pub fn pointer_move(&mut self, point: Point) {
        match &self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing | Gesture::Capturing => self.tools.update(point),
            Gesture::Moving(gesture) => {
                let moved = gesture.apply(point);
                self.apply_live(moved);
            }
            Gesture::Resizing(gesture) => {
                let resized = gesture.apply(point, self.measure.as_ref());
                self.apply_live(vec![resized]);
            }
        }
    }

    fn apply_live(&mut self, elements: Vec<Element>) {
        for element in elements {
            if let Err(e) = self.scene.replace(element) {
                log::warn!("Skipping live update: {}", e);
            }
        }
    }

    /// Pointer released at `point`. Commits the gesture as one snapshot.
    pub fn pointer_up(&mut self, point: Point) -> PointerUpOutcome {
        self.pointer_move(point);
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => PointerUpOutcome::None,
            Gesture::Drawing => {
                let Some(element) = self.tools.end(point) else {
                    return PointerUpOutcome::None;
                };
                match self.scene.commit(element) {
                    Ok(Some(id)) => {
                        self.record();
                        PointerUpOutcome::Committed(id)
                    }
                    Ok(None) => PointerUpOutcome::None,
                    Err(e) => {
                        log::warn!("Dropped drawn element: {}", e);
                        PointerUpOutcome::None
                    }
                }
            }
            Gesture::Capturing => {
                let rect = self.tools.drag_rect();
                self.tools.cancel();
                match rect {
                    Some(rect) if rect.area() > 0.0 => PointerUpOutcome::CaptureRequested(rect),
                    _ => PointerUpOutcome::None,
                }
            }
            Gesture::Moving(gesture) => {
                let changed = gesture
                    .originals()
                    .iter()
                    .any(|original| self.scene.get(original.id()) != Some(original));
                if changed {
                    self.record();
                    PointerUpOutcome::Moved
                } else {
                    PointerUpOutcome::None
                }
            }
            Gesture::Resizing(gesture) => {
                let id = gesture.id();
                if self.scene.get(id) != Some(gesture.original()) {
                    self.record();
                    PointerUpOutcome::Resized(id)
                } else {
                    PointerUpOutcome::None
                }
            }
        }
    }

    /// Abandon the gesture in progress and restore pre-gesture geometry.
    pub fn cancel_gesture(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Moving(gesture) => self.apply_live(gesture.originals().to_vec()),
            Gesture::Resizing(gesture) => self.apply_live(vec![gesture.original().clone()]),
            Gesture::Drawing | Gesture::Capturing | Gesture::Idle => {}
        }
        self.tools.cancel();
    }

    // Keyboard input

    /// Key pressed. Returns true when the editor consumed it.
    pub fn key_down(&mut self, key: &Key, modifiers: Modifiers) -> bool {
        if self.overlay.is_active() {
            return self.overlay_key(key, modifiers);
        }
        match key {
            Key::Delete | Key::Backspace => {
                self.delete_selection();
                true
            }
            Key::Escape => {
                if self.is_gesture_active() {
                    self.cancel_gesture();
                } else {
                    self.selection.clear();
                }
                true
            }
            k if modifiers.action_mod() && k.is_char('a') => {
                self.select_all();
                true
            }
            k if modifiers.action_mod() && k.is_char('z') => {
                if modifiers.shift {
                    self.redo();
                } else {
                    self.undo();
                }
                true
            }
            k if modifiers.action_mod() && k.is_char('y') => {
                self.redo();
                true
            }
            _ => false,
        }
    }

    fn overlay_key(&mut self, key: &Key, modifiers: Modifiers) -> bool {
        match key {
            Key::Escape => {
                self.cancel_text_edit();
                true
            }
            Key::Enter => {
                self.overlay.insert("\n");
                true
            }
            Key::Backspace => {
                self.overlay.backspace();
                true
            }
            Key::Character(c) if !modifiers.action_mod() => {
                self.overlay.insert(c.encode_utf8(&mut [0; 4]));
                true
            }
            // Delete, undo/redo and select-all belong to the overlay while it is open.
            _ => false,
        }
    }

    // Text editing

    /// Open the overlay on the text element under `point`, if any.
    pub fn begin_text_edit_at(&mut self, point: Point) -> bool {
        let Some(id) = self.hit_test(point) else {
            return false;
        };
        self.begin_text_edit(id)
    }

    /// Open the overlay on a text element.
    pub fn begin_text_edit(&mut self, id: ElementId) -> bool {
        if self.is_gesture_active() {
            return false;
        }
        self.overlay.begin_existing(&self.scene, id)
    }

    /// Close the overlay, writing its text into the scene.
    pub fn commit_text_edit(&mut self) -> TextCommit {
        match self.overlay.commit(&mut self.scene) {
            Ok(commit) => {
                if commit.changed_scene() {
                    self.record();
                }
                commit
            }
            Err(e) => {
                log::warn!("Text edit not applied: {}", e);
                TextCommit::Discarded
            }
        }
    }

    /// Close the overlay without touching the scene.
    pub fn cancel_text_edit(&mut self) {
        self.overlay.cancel();
    }

    // Element model operations

    /// Select every element.
    pub fn select_all(&mut self) {
        self.selection = Selection::from_ids(self.scene.ids());
    }

    /// Select exactly these elements.
    pub fn select(&mut self, ids: Vec<ElementId>) {
        self.selection = Selection::from_ids(ids);
        self.selection.retain_existing(&self.scene);
    }

    /// Apply `select_at` semantics at `point`.
    pub fn select_at(&mut self, point: Point, modifiers: Modifiers) {
        let hit = self.hit_test(point);
        selection::select_at(&mut self.selection, &self.scene, hit, modifiers.action_mod());
    }

    /// Remove the selected elements.
    pub fn delete_selection(&mut self) -> usize {
        let ids = self.selection.ids();
        self.remove(&ids)
    }

    /// Remove elements by id.
    pub fn remove(&mut self, ids: &[ElementId]) -> usize {
        if self.is_gesture_active() {
            return 0;
        }
        let removed = self.scene.remove(ids);
        if removed > 0 {
            self.record();
        }
        removed
    }

    /// Add a finished element.
    pub fn commit(&mut self, element: Element) -> EditorResult<Option<ElementId>> {
        let id = self.scene.commit(element)?;
        if id.is_some() {
            self.record();
        }
        Ok(id)
    }

    /// Patch one element.
    pub fn update(&mut self, id: ElementId, patch: ElementPatch) -> EditorResult<UpdateOutcome> {
        let outcome = self.scene.update(id, patch)?;
        self.record();
        Ok(outcome)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.cancel_gesture();
        self.overlay.cancel();
        if self.scene.is_empty() {
            return;
        }
        self.scene.clear();
        self.record();
    }

    /// Set the stroke color of the selection.
    pub fn recolor_selection(&mut self, color: Color) -> EditorResult<bool> {
        self.patch_selection(ElementPatch::default().stroke_color(color))
    }

    /// Set or clear the fill of the selection.
    pub fn fill_selection(&mut self, fill: Option<Color>) -> EditorResult<bool> {
        self.patch_selection(ElementPatch::default().fill_color(fill))
    }

    fn patch_selection(&mut self, patch: ElementPatch) -> EditorResult<bool> {
        let ids = self.selection.ids();
        if ids.is_empty() {
            return Ok(false);
        }
        for id in ids {
            self.scene.update(id, patch.clone())?;
        }
        self.record();
        Ok(true)
    }

    /// Move the selection above everything else.
    pub fn bring_selection_to_front(&mut self) -> bool {
        let ids = self.selection.ids();
        let changed = self.scene.bring_to_front(&ids);
        if changed {
            self.record();
        }
        changed
    }

    /// Move the selection below everything else.
    pub fn send_selection_to_back(&mut self) -> bool {
        let ids = self.selection.ids();
        let changed = self.scene.send_to_back(&ids);
        if changed {
            self.record();
        }
        changed
    }

    /// Put the selected elements into one rigid group.
    pub fn group_selection(&mut self) -> EditorResult<GroupId> {
        let ids = self.selection.ids();
        let group_id = selection::group(&mut self.scene, &ids)?;
        self.record();
        Ok(group_id)
    }

    /// Dissolve every group the selection touches.
    pub fn ungroup_selection(&mut self) -> EditorResult<Vec<ElementId>> {
        let ids = self.selection.ids();
        self.ungroup(&ids)
    }

    /// Dissolve every group referenced by `ids`.
    pub fn ungroup(&mut self, ids: &[ElementId]) -> EditorResult<Vec<ElementId>> {
        let ungrouped = selection::ungroup(&mut self.scene, ids)?;
        self.record();
        Ok(ungrouped)
    }

    /// Group arbitrary elements.
    pub fn group(&mut self, ids: &[ElementId]) -> EditorResult<GroupId> {
        let group_id = selection::group(&mut self.scene, ids)?;
        self.record();
        Ok(group_id)
    }

    // History

    /// Step back one snapshot.
    pub fn undo(&mut self) -> bool {
        if self.overlay.is_active() {
            return false;
        }
        self.cancel_gesture();
        let Some(elements) = self.history.undo() else {
            return false;
        };
        self.scene.restore(elements.to_vec());
        self.after_history_move();
        true
    }

    /// Step forward one snapshot.
    pub fn redo(&mut self) -> bool {
        if self.overlay.is_active() {
            return false;
        }
        self.cancel_gesture();
        let Some(elements) = self.history.redo() else {
            return false;
        };
        self.scene.restore(elements.to_vec());
        self.after_history_move();
        true
    }

    fn after_history_move(&mut self) {
        self.selection.retain_existing(&self.scene);
        self.revision += 1;
    }

    // Host surface

    /// Report the surface height. Large changes rescale vertical geometry.
    ///
    /// Returns true when elements were rescaled.
    pub fn resize_surface(&mut self, height: f64) -> bool {
        let Some(factor) = self.rescaler.begin(height) else {
            return false;
        };
        self.cancel_gesture();
        let mut elements = self.scene.elements().to_vec();
        rescale_vertical(&mut elements, factor);
        self.scene.restore(elements);
        self.record();
        self.rescaler.finish();
        log::info!("Rescaled scene vertically by {:.3} for height {}", factor, height);
        true
    }

    /// Decode an external image and insert it at `position`.
    pub fn import_image(&mut self, bytes: &[u8], position: Point) -> EditorResult<Option<ElementId>> {
        let imported = decode_import(bytes, self.config.max_import_dimension)?;
        self.commit_import(imported, position)
    }

    /// Insert an already decoded image at `position`.
    pub fn commit_import(
        &mut self,
        image: ImportedImage,
        position: Point,
    ) -> EditorResult<Option<ElementId>> {
        let element = Element::Image(Image::new(
            position,
            f64::from(image.width),
            f64::from(image.height),
            image.data,
        ));
        let id = self.commit(element)?;
        if let Some(id) = id {
            self.selection = Selection::Single(id);
        }
        Ok(id)
    }

    /// Copy `rect` out of the rendered surface as a region-capture element.
    pub fn commit_capture(
        &mut self,
        rect: Rect,
        surface: &dyn SurfaceCapture,
    ) -> EditorResult<Option<ElementId>> {
        let rect = rect.abs();
        if rect.area() <= 0.0 {
            return Ok(None);
        }
        let captured = surface.capture_region(rect)?;
        let element = Element::RegionCapture(Image::new(
            Point::new(rect.x0, rect.y0),
            f64::from(captured.width),
            f64::from(captured.height),
            captured.data,
        ));
        self.commit(element)
    }

    /// Replace the scene wholesale. History restarts from it.
    pub fn load_scene(&mut self, scene: Scene) {
        self.cancel_gesture();
        self.overlay.cancel();
        self.scene = scene;
        self.history.reset(self.scene.elements().to_vec());
        self.selection.clear();
        self.revision += 1;
        log::info!("Loaded scene '{}' ({} elements)", self.scene.name, self.scene.len());
    }

    /// Rename the scene (not an undoable edit).
    pub fn set_scene_name(&mut self, name: impl Into<String>) {
        self.scene.name = name.into();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureResult, CapturedRegion};
    use crate::shapes::{Freehand, Rectangle, Text};

    fn drag(editor: &mut Editor, from: Point, to: Point) -> PointerUpOutcome {
        editor.pointer_down(from, Modifiers::NONE);
        editor.pointer_move(Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0));
        editor.pointer_up(to)
    }

    fn draw_rect(editor: &mut Editor, from: Point, to: Point) -> ElementId {
        editor.set_tool(ToolKind::Rectangle);
        let PointerUpOutcome::Committed(id) = drag(editor, from, to) else {
            panic!("expected a committed rectangle");
        };
        editor.set_tool(ToolKind::Select);
        id
    }

    #[test]
    fn test_draw_commits_one_snapshot() {
        let mut editor = Editor::default();
        let id = draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        assert_eq!(editor.scene().len(), 1);
        assert!(editor.scene().contains(id));
        assert_eq!(editor.revision(), 1);
        assert!(editor.undo());
        assert!(editor.scene().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_click_without_drag_commits_nothing() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Circle);
        editor.pointer_down(Point::new(5.0, 5.0), Modifiers::NONE);
        assert_eq!(editor.pointer_up(Point::new(5.0, 5.0)), PointerUpOutcome::None);
        assert!(editor.scene().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_pending_element_while_drawing() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Arrow);
        editor.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE);
        editor.pointer_move(Point::new(30.0, 0.0));
        assert!(matches!(editor.pending_element(), Some(Element::Arrow(_))));
        assert!(editor.key_down(&Key::Escape, Modifiers::NONE));
        assert!(editor.pending_element().is_none());
        assert!(editor.scene().is_empty());
    }

    #[test]
    fn test_move_is_one_snapshot() {
        let mut editor = Editor::default();
        let id = draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(110.0, 60.0));

        editor.pointer_down(Point::new(50.0, 30.0), Modifiers::NONE);
        for step in 1..=5 {
            editor.pointer_move(Point::new(50.0 + step as f64, 30.0));
        }
        assert_eq!(editor.pointer_up(Point::new(60.0, 40.0)), PointerUpOutcome::Moved);

        let Some(Element::Rectangle(r)) = editor.scene().get(id) else {
            panic!("expected rectangle");
        };
        assert_eq!(r.start, Point::new(20.0, 20.0));

        assert!(editor.undo());
        let Some(Element::Rectangle(r)) = editor.scene().get(id) else {
            panic!("expected rectangle");
        };
        assert_eq!(r.start, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_escape_reverts_move() {
        let mut editor = Editor::default();
        let id = draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        let before = editor.scene().get(id).cloned();
        let revision = editor.revision();

        editor.pointer_down(Point::new(50.0, 30.0), Modifiers::NONE);
        editor.pointer_move(Point::new(80.0, 90.0));
        editor.key_down(&Key::Escape, Modifiers::NONE);

        assert_eq!(editor.scene().get(id).cloned(), before);
        assert_eq!(editor.revision(), revision);
        assert_eq!(editor.pointer_up(Point::new(80.0, 90.0)), PointerUpOutcome::None);
    }

    #[test]
    fn test_resize_through_handle() {
        let mut editor = Editor::default();
        let id = draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        editor.select(vec![id]);

        // Bottom-right handle centre sits at (115, 65).
        editor.pointer_down(Point::new(115.0, 65.0), Modifiers::NONE);
        assert_eq!(editor.pointer_up(Point::new(200.0, 100.0)), PointerUpOutcome::Resized(id));
        let Some(Element::Rectangle(r)) = editor.scene().get(id) else {
            panic!("expected rectangle");
        };
        assert_eq!(r.end, Point::new(200.0, 100.0));
    }

    #[test]
    fn test_click_on_handle_changes_nothing() {
        let mut editor = Editor::default();
        let id = draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        editor.select(vec![id]);
        let before = editor.scene().get(id).cloned();
        let revision = editor.revision();

        // Top-left handle centre sits at (5, 5).
        editor.pointer_down(Point::new(5.0, 5.0), Modifiers::NONE);
        assert_eq!(editor.pointer_up(Point::new(5.0, 5.0)), PointerUpOutcome::None);
        assert_eq!(editor.scene().get(id).cloned(), before);
        assert_eq!(editor.revision(), revision);
    }

    #[test]
    fn test_click_on_freehand_handle_changes_nothing() {
        let mut editor = Editor::default();
        let stroke = Freehand::from_points(vec![Point::new(0.0, 0.0), Point::new(100.0, 100.0)]);
        let id = editor.commit(Element::Freehand(stroke)).unwrap().unwrap();
        editor.select(vec![id]);
        let before = editor.scene().get(id).cloned();
        let revision = editor.revision();

        editor.pointer_down(Point::new(115.0, 115.0), Modifiers::NONE);
        assert!(editor.is_gesture_active());
        assert_eq!(editor.pointer_up(Point::new(115.0, 115.0)), PointerUpOutcome::None);
        assert_eq!(editor.scene().get(id).cloned(), before);
        assert_eq!(editor.revision(), revision);
        assert!(editor.undo());
        assert!(editor.scene().is_empty());
    }

    #[test]
    fn test_multi_selection_has_no_handles() {
        let mut editor = Editor::default();
        let a = draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        let b = draw_rect(&mut editor, Point::new(200.0, 10.0), Point::new(300.0, 60.0));
        editor.select(vec![a, b]);
        assert!(editor.handle_rects().is_none());
        editor.select(vec![a]);
        assert!(editor.handle_rects().is_some());
    }

    #[test]
    fn test_keyboard_delete_and_select_all() {
        let mut editor = Editor::default();
        draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        draw_rect(&mut editor, Point::new(200.0, 10.0), Point::new(300.0, 60.0));

        assert!(editor.key_down(&Key::Character('a'), Modifiers::CTRL));
        assert_eq!(editor.selection().len(), 2);
        assert!(editor.key_down(&Key::Delete, Modifiers::NONE));
        assert!(editor.scene().is_empty());
        assert!(editor.selection().is_empty());

        assert!(editor.key_down(&Key::Character('z'), Modifiers::CTRL));
        assert_eq!(editor.scene().len(), 2);
        assert!(editor.key_down(&Key::Character('z'), Modifiers::CTRL.with_shift()));
        assert!(editor.scene().is_empty());
    }

    #[test]
    fn test_text_tool_flow() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Text);
        editor.pointer_down(Point::new(20.0, 20.0), Modifiers::NONE);
        assert!(editor.overlay().is_active());

        for c in "Hi".chars() {
            editor.key_down(&Key::Character(c), Modifiers::NONE);
        }
        // Delete is suppressed while the overlay is open.
        assert!(!editor.key_down(&Key::Delete, Modifiers::NONE));
        assert!(!editor.key_down(&Key::Character('z'), Modifiers::CTRL));

        // Clicking elsewhere commits and is consumed.
        editor.pointer_down(Point::new(300.0, 300.0), Modifiers::NONE);
        assert!(!editor.overlay().is_active());
        assert_eq!(editor.scene().len(), 1);
        let text = editor.scene().elements()[0].as_text().unwrap();
        assert_eq!(text.content, "Hi");
        assert_eq!(text.start, Point::new(20.0, 20.0));
    }

    #[test]
    fn test_edit_existing_text_to_blank_deletes() {
        let mut editor = Editor::default();
        let id = editor
            .commit(Element::Text(Text::new(Point::new(0.0, 0.0), "note".to_string())))
            .unwrap()
            .unwrap();
        assert!(editor.begin_text_edit(id));
        assert_eq!(editor.overlay().editing_id(), Some(id));
        editor.overlay_mut().set_text("   ");
        assert_eq!(editor.commit_text_edit(), TextCommit::Deleted(id));
        assert!(editor.scene().is_empty());
    }

    #[test]
    fn test_escape_cancels_text_edit() {
        let mut editor = Editor::default();
        let id = editor
            .commit(Element::Text(Text::new(Point::new(0.0, 0.0), "note".to_string())))
            .unwrap()
            .unwrap();
        let revision = editor.revision();
        editor.begin_text_edit(id);
        editor.overlay_mut().set_text("changed");
        assert!(editor.key_down(&Key::Escape, Modifiers::NONE));
        assert!(!editor.overlay().is_active());
        assert_eq!(editor.scene().get(id).and_then(Element::as_text).unwrap().content, "note");
        assert_eq!(editor.revision(), revision);
    }

    #[test]
    fn test_group_errors_do_not_record() {
        let mut editor = Editor::default();
        let a = draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        editor.select(vec![a]);
        let revision = editor.revision();
        assert_eq!(
            editor.group_selection(),
            Err(EditorError::Selection(SelectionError::InsufficientSelection))
        );
        assert_eq!(
            editor.ungroup_selection(),
            Err(EditorError::Selection(SelectionError::NotGrouped))
        );
        assert_eq!(editor.revision(), revision);
    }

    #[test]
    fn test_recolor_selection() {
        let mut editor = Editor::default();
        let a = draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        let b = draw_rect(&mut editor, Point::new(200.0, 10.0), Point::new(300.0, 60.0));
        editor.select(vec![a, b]);
        let red = Color::new(255, 0, 0, 255);
        assert_eq!(editor.recolor_selection(red), Ok(true));
        assert!(editor.scene().elements().iter().all(|e| e.style().stroke_color == red));
        editor.undo();
        assert!(editor.scene().elements().iter().all(|e| e.style().stroke_color == Color::black()));
    }

    #[test]
    fn test_z_order_commands() {
        let mut editor = Editor::default();
        let a = draw_rect(&mut editor, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let b = draw_rect(&mut editor, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert_eq!(editor.hit_test(Point::new(50.0, 50.0)), Some(b));
        editor.select(vec![a]);
        assert!(editor.bring_selection_to_front());
        assert_eq!(editor.hit_test(Point::new(50.0, 50.0)), Some(a));
        assert!(editor.send_selection_to_back());
        assert_eq!(editor.hit_test(Point::new(50.0, 50.0)), Some(b));
    }

    #[test]
    fn test_resize_surface_rescales() {
        let mut editor = Editor::default();
        let id = draw_rect(&mut editor, Point::new(0.0, 20.0), Point::new(10.0, 40.0));
        assert!(!editor.resize_surface(100.0));
        assert!(!editor.resize_surface(130.0));
        assert!(editor.resize_surface(200.0));
        let Some(Element::Rectangle(r)) = editor.scene().get(id) else {
            panic!("expected rectangle");
        };
        assert_eq!(r.start, Point::new(0.0, 40.0));
        assert_eq!(r.end, Point::new(10.0, 80.0));
    }

    struct FixedSurface;

    impl SurfaceCapture for FixedSurface {
        fn capture_region(&self, rect: Rect) -> CaptureResult<CapturedRegion> {
            Ok(CapturedRegion {
                data: "data:image/png;base64,AAAA".to_string(),
                width: rect.width() as u32,
                height: rect.height() as u32,
            })
        }

        fn capture_all(&self) -> CaptureResult<CapturedRegion> {
            Err(CaptureError::EmptyRegion)
        }
    }

    #[test]
    fn test_region_capture_flow() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::RegionCapture);
        editor.pointer_down(Point::new(40.0, 30.0), Modifiers::NONE);
        editor.pointer_move(Point::new(20.0, 50.0));
        assert_eq!(editor.capture_rect(), Some(Rect::new(20.0, 30.0, 40.0, 50.0)));
        let PointerUpOutcome::CaptureRequested(rect) = editor.pointer_up(Point::new(10.0, 60.0)) else {
            panic!("expected a capture request");
        };
        assert!(editor.scene().is_empty());

        let id = editor.commit_capture(rect, &FixedSurface).unwrap().unwrap();
        let Some(Element::RegionCapture(image)) = editor.scene().get(id) else {
            panic!("expected region capture");
        };
        assert_eq!(image.start, Point::new(10.0, 30.0));
        assert!((image.width - 30.0).abs() < f64::EPSILON);
        assert!((image.height - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_import_failure_commits_nothing() {
        let mut editor = Editor::default();
        let result = editor.import_image(b"not an image", Point::ZERO);
        assert!(matches!(result, Err(EditorError::Import(ImportError::Decode(_)))));
        assert!(editor.scene().is_empty());
        assert_eq!(editor.revision(), 0);
    }

    #[test]
    fn test_load_scene_resets_history() {
        let mut editor = Editor::default();
        draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        let mut loaded = Scene::new("Loaded");
        loaded
            .commit(Element::Rectangle(Rectangle::new(Point::ZERO, Point::new(5.0, 5.0))))
            .unwrap();
        editor.load_scene(loaded.clone());
        assert_eq!(editor.scene(), &loaded);
        assert!(!editor.can_undo());
        assert!(!editor.undo());
    }
}
