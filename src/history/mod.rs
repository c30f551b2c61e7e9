use std::sync::Arc;

use uuid::Uuid;

mod codec;
pub use codec::{PngCodec, RasterCodec};

/// Default bound on the snapshot sequence length.
pub const HISTORY_MAX_LEN: usize = 30;

/// One raster snapshot in the history sequence: an id plus the encoded
/// bytes produced by the raster codec. Entries compare by content so an
/// unchanged raster can be recognized.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    id: Uuid,
    bytes: Arc<Vec<u8>>,
}

impl HistoryEntry {
    fn new(bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn bytes_arc(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }
}

impl PartialEq for HistoryEntry {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

/// Bounded, indexable sequence of raster snapshots with an undo/redo
/// cursor.
///
/// Invariants: the sequence never exceeds `max_len` (oldest entries are
/// evicted first); the entry at the cursor always equals the currently
/// rendered raster; pushing while the cursor is behind the tail discards
/// the forward suffix.
pub struct HistoryManager {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    max_len: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::with_max_len(HISTORY_MAX_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_len: max_len.max(1),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor + 1 < self.entries.len()
    }

    pub fn entry(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Append a snapshot. Returns `false` (and changes nothing) when the
    /// bytes equal the entry at the cursor. Otherwise truncates any forward
    /// suffix, evicts from the front past `max_len`, and moves the cursor
    /// to the new tail.
    pub fn push(&mut self, bytes: Vec<u8>) -> bool {
        if let Some(current) = self.entries.get(self.cursor) {
            if *current.bytes == bytes {
                log::debug!("history push skipped: snapshot unchanged");
                return false;
            }
        }
        if !self.entries.is_empty() && self.cursor + 1 < self.entries.len() {
            let discarded = self.entries.len() - (self.cursor + 1);
            log::debug!("history push: discarding {discarded} redo entries");
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(HistoryEntry::new(bytes));
        if self.entries.len() > self.max_len {
            let overflow = self.entries.len() - self.max_len;
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;
        true
    }

    /// Step the cursor back, returning the entry to restore. `None` when
    /// already at the front.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::debug!("history undo -> cursor {}", self.cursor);
        self.entries.get(self.cursor)
    }

    /// Step the cursor forward, returning the entry to restore. `None`
    /// when already at the tail.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("history redo -> cursor {}", self.cursor);
        self.entries.get(self.cursor)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
