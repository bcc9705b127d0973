//! Debounced auto-save of the current scene.
//!
//! Every observed change restarts the quiet period; only the scene as it
//! stands when the period elapses is written.

use crate::config::EditorConfig;
use crate::scene::Scene;
use crate::storage::{SnapshotLibrary, Storage};
use std::time::{Duration, Instant};

/// Default debounce delay in milliseconds.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;

/// Manages debounced persistence of the current scene slot.
///
/// Owned by one editor instance; dropping it cancels any pending save.
pub struct AutoSaveManager<S: Storage> {
    library: SnapshotLibrary<S>,
    /// Quiet period after the last change.
    delay: Duration,
    /// When the pending save fires, if one is pending.
    deadline: Option<Instant>,
    /// Editor revision last seen.
    seen_revision: Option<u64>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(library: SnapshotLibrary<S>) -> Self {
        Self {
            library,
            delay: Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
            deadline: None,
            seen_revision: None,
        }
    }

    /// Create a manager using the configured debounce delay.
    pub fn from_config(library: SnapshotLibrary<S>, config: &EditorConfig) -> Self {
        Self::new(library).with_delay(config.autosave_delay())
    }

    /// Set the debounce delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record the editor revision; a new revision restarts the timer.
    pub fn observe(&mut self, revision: u64) {
        self.observe_at(revision, Instant::now());
    }

    pub fn observe_at(&mut self, revision: u64, now: Instant) {
        match self.seen_revision {
            None => self.seen_revision = Some(revision),
            Some(seen) if seen == revision => {}
            Some(_) => {
                self.seen_revision = Some(revision);
                self.deadline = Some(now + self.delay);
            }
        }
    }

    /// Whether a save is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the pending save should run at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Time left until the pending save, for scheduling the next poll.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Drop any pending save.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Save if the debounce period has elapsed. Returns true if a save ran.
    pub async fn poll(&mut self, scene: &Scene) -> bool {
        self.poll_at(scene, Instant::now()).await
    }

    /// Save if due at `now`.
    ///
    /// A failed write is logged and retried after another delay; editing
    /// is never interrupted.
    pub async fn poll_at(&mut self, scene: &Scene, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        match self.library.save_current(scene).await {
            Ok(()) => {
                self.deadline = None;
                log::debug!("Auto-saved scene '{}'", scene.name);
                true
            }
            Err(e) => {
                log::warn!("Auto-save failed: {}", e);
                self.deadline = Some(now + self.delay);
                false
            }
        }
    }

    /// Write immediately, regardless of the timer.
    pub async fn flush(&mut self, scene: &Scene) -> bool {
        self.deadline = Some(Instant::now());
        self.poll(scene).await
    }

    pub fn library(&self) -> &SnapshotLibrary<S> {
        &self.library
    }
}
