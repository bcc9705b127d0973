//! Named snapshots, their index, and the always-on current-scene slot.

use super::{Storage, StorageError, StorageResult};
use crate::scene::Scene;
use crate::snapshot::{self, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Key of the auto-saved current scene.
pub const CURRENT_KEY: &str = "__current__";

/// Key of the named-snapshot index.
pub const INDEX_KEY: &str = "__index__";

/// One named snapshot as listed in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub key: String,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Persistence adapter over a [`Storage`] backend.
///
/// Every key listed in the index refers to a stored snapshot.
pub struct SnapshotLibrary<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> Clone for SnapshotLibrary<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: Storage> SnapshotLibrary<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Write the scene into the current-scene slot.
    pub async fn save_current(&self, scene: &Scene) -> StorageResult<()> {
        let blob = encode(&Snapshot::capture(scene))?;
        self.storage.save(CURRENT_KEY, &blob).await
    }

    /// Read the current-scene slot, if anything was saved yet.
    pub async fn load_current(&self) -> StorageResult<Option<Scene>> {
        match self.storage.load(CURRENT_KEY).await {
            Ok(blob) => Ok(Some(snapshot::deserialize(&blob)?.into_scene())),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Store the scene as a new named snapshot and list it in the index.
    ///
    /// Returns the new snapshot's key. If the index cannot be updated the
    /// snapshot write is undone.
    pub async fn save_as(&self, name: &str, scene: &Scene) -> StorageResult<String> {
        let mut snapshot = Snapshot::capture(scene);
        snapshot.name = name.to_string();
        let key = format!("snapshot-{}", Uuid::new_v4());

        let mut index = self.index().await?;
        self.storage.save(&key, &encode(&snapshot)?).await?;

        index.push(IndexEntry {
            key: key.clone(),
            name: snapshot.name,
            timestamp: snapshot.timestamp,
        });
        if let Err(e) = self.write_index(&index).await {
            if let Err(cleanup) = self.storage.delete(&key).await {
                log::warn!("Failed to roll back snapshot {}: {}", key, cleanup);
            }
            return Err(e);
        }

        log::info!("Saved snapshot '{}' as {}", name, key);
        Ok(key)
    }

    /// Read a named snapshot.
    pub async fn load(&self, key: &str) -> StorageResult<Scene> {
        let blob = self.storage.load(key).await?;
        let scene = snapshot::deserialize(&blob)?.into_scene();
        log::info!("Loaded snapshot {} ({} elements)", key, scene.len());
        Ok(scene)
    }

    /// Remove a named snapshot and its index entry.
    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut index = self.index().await?;
        let before = index.len();
        index.retain(|entry| entry.key != key);
        if index.len() == before && !self.storage.exists(key).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        // Index first: a failed blob delete then leaves an orphan, never a dangling key.
        self.write_index(&index).await?;
        if let Err(e) = self.storage.delete(key).await {
            log::warn!("Snapshot {} unlisted but not deleted: {}", key, e);
        }
        log::info!("Deleted snapshot {}", key);
        Ok(())
    }

    /// Named snapshots in save order.
    pub async fn index(&self) -> StorageResult<Vec<IndexEntry>> {
        match self.storage.load(INDEX_KEY).await {
            Ok(blob) => serde_json::from_str(&blob)
                .map_err(|e| StorageError::Malformed(format!("snapshot index: {}", e))),
            Err(StorageError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn write_index(&self, index: &[IndexEntry]) -> StorageResult<()> {
        let blob = serde_json::to_string(index)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.save(INDEX_KEY, &blob).await
    }
}

fn encode(snapshot: &Snapshot) -> StorageResult<String> {
    snapshot
        .to_json()
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Element, Rectangle};
    use crate::storage::{MemoryStorage, block_on};
    use kurbo::Point;

    fn scene() -> Scene {
        let mut scene = Scene::new("Board");
        scene
            .commit(Element::Rectangle(Rectangle::new(
                Point::new(10.0, 10.0),
                Point::new(110.0, 60.0),
            )))
            .unwrap();
        scene
    }

    #[test]
    fn test_save_as_and_load() {
        let library = SnapshotLibrary::new(Arc::new(MemoryStorage::new()));
        let original = scene();
        let key = block_on(library.save_as("First", &original)).unwrap();

        let index = block_on(library.index()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].key, key);
        assert_eq!(index[0].name, "First");

        let loaded = block_on(library.load(&key)).unwrap();
        assert_eq!(loaded.name, "First");
        assert_eq!(loaded.elements(), original.elements());
    }

    #[test]
    fn test_delete_keeps_index_consistent() {
        let storage = Arc::new(MemoryStorage::new());
        let library = SnapshotLibrary::new(storage.clone());
        let a = block_on(library.save_as("A", &scene())).unwrap();
        let b = block_on(library.save_as("B", &scene())).unwrap();

        block_on(library.delete(&a)).unwrap();
        let keys: Vec<String> = block_on(library.index()).unwrap().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![b]);
        assert!(!block_on(storage.exists(&a)).unwrap());

        assert!(matches!(block_on(library.delete(&a)), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_quota_failure_rolls_back() {
        let blob_len = Snapshot::capture(&scene()).to_json().unwrap().len();
        // Room for one snapshot but not for the index as well.
        let storage = Arc::new(MemoryStorage::with_quota(blob_len + 60));
        let library = SnapshotLibrary::new(storage.clone());

        let result = block_on(library.save_as("Board", &scene()));
        assert!(matches!(result, Err(StorageError::QuotaExceeded(_))));
        assert!(block_on(storage.list()).unwrap().is_empty());
        assert!(block_on(library.index()).unwrap().is_empty());
    }

    #[test]
    fn test_current_slot() {
        let library = SnapshotLibrary::new(Arc::new(MemoryStorage::new()));
        assert!(block_on(library.load_current()).unwrap().is_none());

        let original = scene();
        block_on(library.save_current(&original)).unwrap();
        let current = block_on(library.load_current()).unwrap().unwrap();
        assert_eq!(current, original);
        assert!(block_on(library.index()).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        block_on(storage.save("broken", "{\"name\": 3}")).unwrap();
        let library = SnapshotLibrary::new(storage);
        assert!(matches!(block_on(library.load("broken")), Err(StorageError::Malformed(_))));
    }
}
