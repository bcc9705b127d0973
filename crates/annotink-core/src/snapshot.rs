//! Persisted snapshot format: `{ name, elements, timestamp }`.

use crate::scene::Scene;
use crate::shapes::{Element, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Snapshot decoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Malformed(String),
}

/// Result type for snapshot decoding.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// A named, serialized scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub elements: Vec<Element>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Snapshot {
    /// Capture a scene, stamped with the current time.
    pub fn capture(scene: &Scene) -> Self {
        Self {
            name: scene.name.clone(),
            elements: scene.elements().to_vec(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Turn the snapshot back into a scene.
    pub fn into_scene(self) -> Scene {
        let mut scene = Scene::new(self.name);
        scene.restore(self.elements);
        scene
    }

    /// Check the element invariants a stored scene must satisfy.
    pub fn validate(&self) -> SnapshotResult<()> {
        let mut seen: HashSet<ElementId> = HashSet::new();
        for element in &self.elements {
            let id = element.id();
            if !seen.insert(id) {
                return Err(SnapshotError::Malformed(format!("duplicate element id {}", id)));
            }
            if !element.is_finite() {
                return Err(SnapshotError::Malformed(format!(
                    "element {} has non-finite geometry",
                    id
                )));
            }
            if !element.has_content() {
                return Err(SnapshotError::Malformed(format!(
                    "{} element {} has no content",
                    element.kind_name(),
                    id
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Serialize a scene into a snapshot blob.
pub fn serialize(scene: &Scene) -> Result<String, serde_json::Error> {
    Snapshot::capture(scene).to_json()
}

/// Parse and validate a snapshot blob.
///
/// Anything that fails to parse or violates an element invariant is
/// rejected as a whole; no partial scene is produced.
pub fn deserialize(blob: &str) -> SnapshotResult<Snapshot> {
    let snapshot: Snapshot =
        serde_json::from_str(blob).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
    snapshot.validate()?;
    Ok(snapshot)
}
