//! AnnotInk Export
//!
//! Headless rendering of persisted snapshots to PNG files.

mod export;

pub use export::{DEFAULT_SIZE, ExportOptions, MARGIN, run, scene_extent};
