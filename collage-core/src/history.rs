//! Undo/redo history of committed canvas states.
//!
//! Each entry is a full snapshot of the ordered item list. The index points
//! at the entry matching the live canvas; pushing after an undo drops every
//! entry past the index.

use crate::item::CanvasItem;

/// Snapshot of the ordered item list at a point in time.
pub type HistoryEntry = Vec<CanvasItem>;

/// Append-only snapshot timeline with a cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    limit: Option<usize>,
}

impl History {
    /// History holding one empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Vec::new())
    }

    /// History whose first snapshot is `items`.
    #[must_use]
    pub fn starting_at(items: HistoryEntry) -> Self {
        Self {
            entries: vec![items],
            index: 0,
            limit: None,
        }
    }

    /// Cap the number of stored snapshots; the oldest are dropped first.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.max(1));
        self.enforce_limit();
        self
    }

    /// Record a new snapshot after the current one.
    ///
    /// Any redo entries are discarded.
    pub fn push(&mut self, items: HistoryEntry) {
        self.entries.truncate(self.index + 1);
        self.entries.push(items);
        self.index = self.entries.len() - 1;
        self.enforce_limit();
    }

    /// Replace the snapshot at the cursor without adding an undo step.
    ///
    /// Used for changes that are not undoable on their own, such as the
    /// paint-order bump of a selection.
    pub fn amend(&mut self, items: HistoryEntry) {
        if let Some(entry) = self.entries.get_mut(self.index) {
            *entry = items;
        }
    }

    /// Apply `f` to every item of every snapshot.
    ///
    /// Keeps undo and redo consistent after a change that applies to all
    /// states, such as a new grid.
    pub fn update_items(&mut self, mut f: impl FnMut(&mut CanvasItem)) {
        self.entries.iter_mut().flatten().for_each(&mut f);
    }

    /// Step back one snapshot.
    ///
    /// Returns `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward one snapshot.
    ///
    /// Returns `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    /// Cursor position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least its starting snapshot.
    #[must_use]
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
            self.index = self.index.saturating_sub(excess);
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
