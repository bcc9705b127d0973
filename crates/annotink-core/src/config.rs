//! Editor tunables.

use crate::shapes::{Color, ElementStyle, Text};
use crate::storage::DEFAULT_AUTOSAVE_DELAY_MS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors reading an editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid config: {0}")]
    Parse(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Every tunable of the editor. Missing keys in a config file fall back to
/// the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Distance within which a line, arrow or circle outline counts as hit.
    pub hit_tolerance: f64,
    /// Padding added around a freehand stroke's bounding box for hit testing.
    pub freehand_padding: f64,
    /// Side length of a resize handle square.
    pub handle_size: f64,
    /// Padding between an element's box and its resize handles.
    pub handle_padding: f64,
    /// Smallest width/height an image can be resized to.
    pub min_image_size: f64,
    /// Surface height change required before elements are rescaled.
    pub rescale_threshold: f64,
    /// Quiet period before an auto-save fires, in milliseconds.
    pub autosave_delay_ms: u64,
    /// Largest width or height of an imported image.
    pub max_import_dimension: u32,
    /// Maximum number of history entries (None = unlimited).
    pub history_limit: Option<usize>,
    /// Stroke color for new elements.
    pub stroke_color: Color,
    /// Line width for new elements.
    pub line_width: f64,
    /// Font size for new text elements.
    pub font_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_tolerance: 10.0,
            freehand_padding: 10.0,
            handle_size: 8.0,
            handle_padding: 5.0,
            min_image_size: 20.0,
            rescale_threshold: 50.0,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            max_import_dimension: 600,
            history_limit: None,
            stroke_color: Color::black(),
            line_width: 2.0,
            font_size: Text::DEFAULT_FONT_SIZE,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Auto-save debounce as a duration.
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Style applied to newly drawn elements.
    pub fn default_style(&self) -> ElementStyle {
        ElementStyle {
            stroke_color: self.stroke_color,
            fill_color: None,
            line_width: self.line_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!((config.hit_tolerance - 10.0).abs() < f64::EPSILON);
        assert!((config.handle_size - 8.0).abs() < f64::EPSILON);
        assert_eq!(config.autosave_delay(), Duration::from_secs(1));
        assert_eq!(config.max_import_dimension, 600);
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(r#"{"hit_tolerance": 4.0, "history_limit": 20}"#).unwrap();
        assert!((config.hit_tolerance - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.history_limit, Some(20));
        assert!((config.rescale_threshold - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EditorConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        std::fs::write(&path, r#"{"font_size": 32.0}"#).unwrap();
        let config = EditorConfig::load(&path).unwrap();
        assert!((config.font_size - 32.0).abs() < f64::EPSILON);

        let missing = EditorConfig::load(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
