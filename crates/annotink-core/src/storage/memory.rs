//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// An optional byte quota models hosts whose store can fill up.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage that refuses writes past `bytes` in total.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            blobs: RwLock::default(),
            quota: Some(bytes),
        }
    }

    /// Total bytes currently stored (keys and values).
    pub fn used_bytes(&self) -> usize {
        self.blobs
            .read()
            .map(|blobs| blobs.iter().map(|(k, v)| k.len() + v.len()).sum())
            .unwrap_or(0)
    }
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, blob: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let blob = blob.to_string();
        Box::pin(async move {
            let mut blobs = self.blobs.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            if let Some(quota) = self.quota {
                let used: usize = blobs
                    .iter()
                    .filter(|(k, _)| **k != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                let needed = used + key.len() + blob.len();
                if needed > quota {
                    return Err(StorageError::QuotaExceeded(format!(
                        "{} bytes needed, {} allowed",
                        needed, quota
                    )));
                }
            }
            blobs.insert(key, blob);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let key = key.to_string();
        Box::pin(async move {
            let blobs = self.blobs.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            blobs.get(&key)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut blobs = self.blobs.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            blobs.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let blobs = self.blobs.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(blobs.keys().cloned().collect())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let blobs = self.blobs.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(blobs.contains_key(&key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        block_on(storage.save("test", "{}")).unwrap();
        assert_eq!(block_on(storage.load("test")).unwrap(), "{}");
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let storage = MemoryStorage::new();
        block_on(storage.save("test", "{}")).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());
        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        block_on(storage.save("doc1", "a")).unwrap();
        block_on(storage.save("doc2", "b")).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"doc1".to_string()));
        assert!(list.contains(&"doc2".to_string()));
    }

    #[test]
    fn test_quota() {
        let storage = MemoryStorage::with_quota(10);
        block_on(storage.save("k", "12345")).unwrap();
        // Overwriting the same key only counts the new value.
        block_on(storage.save("k", "123456789")).unwrap();
        let result = block_on(storage.save("other", "x"));
        assert!(matches!(result, Err(StorageError::QuotaExceeded(_))));
        assert_eq!(storage.used_bytes(), 10);
    }
}
