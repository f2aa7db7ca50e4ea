//! Snapshot-based undo/redo
//!
//! Each mutating editing operation ends by recording a full structured
//! snapshot of the document. Undo/redo move an index over the snapshot
//! stack and restore the document from it; they never mutate snapshots.

use super::document::LevelDocument;

/// Maximum number of history entries kept. The oldest entry is evicted
/// FIFO when exceeded, shifting the current index to compensate.
pub const MAX_HISTORY: usize = 50;

/// Undo/redo stack over the level document
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<LevelDocument>,
    /// Index of the entry matching the current document state
    index: usize,
}

impl History {
    /// Start a fresh history whose single entry is the given state
    pub fn new(initial: LevelDocument) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    /// Reset the stack to a single entry (used by `load` without history)
    pub fn reset(&mut self, state: LevelDocument) {
        self.entries.clear();
        self.entries.push(state);
        self.index = 0;
    }

    /// Record the current document state. Truncates any redo tail, appends,
    /// and evicts the oldest entry when over the cap. Does not change the
    /// live document.
    pub fn snapshot(&mut self, state: LevelDocument) {
        self.entries.truncate(self.index + 1);
        self.entries.push(state);
        self.index += 1;

        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
            self.index -= 1;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Step back one entry and return the state to restore.
    /// Returns None when already at the initial snapshot, or when the
    /// target entry is missing (logged and abandoned, prior state intact).
    pub fn undo(&mut self) -> Option<LevelDocument> {
        if !self.can_undo() {
            return None;
        }
        let target = self.index - 1;
        match self.entries.get(target) {
            Some(state) => {
                self.index = target;
                Some(state.clone())
            }
            None => {
                eprintln!("history: undo target {} missing, restore abandoned", target);
                None
            }
        }
    }

    /// Step forward one entry and return the state to restore
    pub fn redo(&mut self) -> Option<LevelDocument> {
        if !self.can_redo() {
            return None;
        }
        let target = self.index + 1;
        match self.entries.get(target) {
            Some(state) => {
                self.index = target;
                Some(state.clone())
            }
            None => {
                eprintln!("history: redo target {} missing, restore abandoned", target);
                None
            }
        }
    }

    /// Number of entries on the stack
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
