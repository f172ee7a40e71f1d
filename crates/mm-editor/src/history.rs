//! Undo/redo history.
//!
//! History is a list of diagram states with a cursor pointing at the entry
//! that matches the live diagram. Recording truncates any redo-able future,
//! appends, and moves the cursor to the new entry; undo/redo move the cursor
//! and hand back the entry for the caller to restore.
//!
//! The list is capped: when full, the oldest entry is evicted and the
//! cursor shifts with it, so it keeps pointing at the newest state.

use crate::config::DEFAULT_HISTORY_LIMIT;
use mm_core::Snapshot;

/// Bounded linear undo history of diagram snapshots.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    /// Index of the entry matching the live state. Meaningless when
    /// `entries` is empty.
    cursor: usize,
    /// Maximum number of entries.
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: Vec::with_capacity(limit),
            cursor: 0,
            limit,
        }
    }

    /// Append `snapshot` after the cursor, discarding any redo-able entries.
    pub fn record(&mut self, snapshot: Snapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.limit {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() - 1;
        log::debug!("history: recorded entry {} of {}", self.cursor + 1, self.entries.len());
    }

    /// Drop everything and start over from `snapshot`.
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.entries.clear();
        self.entries.push(snapshot);
        self.cursor = 0;
    }

    /// Step back one entry. `None` (and no change) at the first entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::debug!("history: undo to entry {}", self.cursor + 1);
        self.entries.get(self.cursor)
    }

    /// Step forward one entry. `None` (and no change) at the last entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("history: redo to entry {}", self.cursor + 1);
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor < self.entries.len() - 1
    }

    /// The entry at the cursor.
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    /// Cursor position, `None` while empty.
    pub fn index(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
