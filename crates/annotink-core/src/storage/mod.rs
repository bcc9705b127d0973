//! Storage abstraction for persistence.

mod autosave;
mod file;
mod library;
mod memory;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_DELAY_MS};
pub use file::FileStorage;
pub use library::{CURRENT_KEY, INDEX_KEY, IndexEntry, SnapshotLibrary};
pub use memory::MemoryStorage;

use crate::snapshot::SnapshotError;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Malformed data: {0}")]
    Malformed(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<SnapshotError> for StorageError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Malformed(msg) => StorageError::Malformed(msg),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Key/value backend holding serialized blobs.
///
/// Implementations can keep blobs in memory, on the filesystem, or in any
/// host-provided store.
pub trait Storage: Send + Sync {
    /// Write a blob, replacing any previous value.
    fn save(&self, key: &str, blob: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Read a blob.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>>;

    /// Remove a blob. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    // Simple blocking executor for tests
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
