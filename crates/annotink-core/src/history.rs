//! Linear undo/redo history of full scene snapshots.

use crate::shapes::Element;

/// Ordered snapshots plus a cursor pointing at the current one.
///
/// Entry 0 is the baseline. A commit discards everything after the cursor,
/// so there is never more than one redo branch.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Vec<Element>>,
    cursor: usize,
    limit: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl History {
    /// Start a history whose baseline is `baseline`.
    pub fn new(baseline: Vec<Element>) -> Self {
        Self {
            entries: vec![baseline],
            cursor: 0,
            limit: None,
        }
    }

    /// Cap the number of stored entries. The oldest entries are dropped first.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.map(|l| l.max(1));
        self.enforce_limit();
        self
    }

    /// Record a new snapshot after a committed mutation.
    pub fn commit(&mut self, elements: &[Element]) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(elements.to_vec());
        self.cursor = self.entries.len() - 1;
        self.enforce_limit();
        log::debug!("History commit (entry {} of {})", self.cursor + 1, self.entries.len());
    }

    /// Step back one entry. Returns `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&[Element]> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::debug!("Undo to entry {}", self.cursor + 1);
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry. Returns `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&[Element]> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("Redo to entry {}", self.cursor + 1);
        Some(&self.entries[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> &[Element] {
        &self.entries[self.cursor]
    }

    /// Drop all entries and start over from a new baseline.
    pub fn reset(&mut self, baseline: Vec<Element>) {
        self.entries = vec![baseline];
        self.cursor = 0;
    }

    /// Number of stored entries, baseline included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        if self.entries.len() > limit {
            let excess = self.entries.len() - limit;
            self.entries.drain(..excess);
            self.cursor = self.cursor.saturating_sub(excess);
        }
    }
}
