//! AnnotInk Core Library
//!
//! Platform-agnostic scene model, hit-testing, transforms, history and
//! persistence for the AnnotInk annotation editor.

pub mod capture;
pub mod config;
pub mod editor;
pub mod history;
pub mod image_import;
pub mod input;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod snapshot;
pub mod storage;
pub mod text_edit;
pub mod tools;
pub mod transform;

pub use capture::{CaptureError, CaptureResult, CapturedRegion, SurfaceCapture};
pub use config::{ConfigError, EditorConfig};
pub use editor::{Editor, EditorError, EditorResult, PointerUpOutcome};
pub use history::History;
pub use hit_test::{Corner, HitTester};
pub use image_import::{ImportError, ImportedImage, decode_import};
pub use input::{Key, Modifiers};
pub use scene::{ElementPatch, Scene, SceneError, SceneResult, UpdateOutcome};
pub use selection::{Selection, SelectionError};
pub use shapes::{Color, Element, ElementId, ElementStyle, GroupId};
pub use snapshot::{Snapshot, SnapshotError};
pub use text_edit::{TextCommit, TextEditOverlay};
pub use tools::{ToolKind, ToolManager};
pub use transform::{ContainerRescaler, MoveGesture, ResizeGesture};
