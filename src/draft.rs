//! In-memory session draft
//!
//! While a session is being composed, its sets live in a mutable
//! ordered draft that is never itself persisted. Committing the draft
//! (via the manager's `append_session`) strips blank rows; discarding
//! it loses the rows with no persistence. There is no saved-draft
//! state.

use crate::model::SetItem;

/// Ordered sequence of set drafts for one session in progress
///
/// Invariant: the draft never grows a second blank row at the tail,
/// so repeated "add set" actions cannot accumulate empty rows.
#[derive(Debug, Default)]
pub struct SessionDraft {
    sets: Vec<SetItem>,
}

impl SessionDraft {
    /// Create an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// The draft sets in insertion order
    pub fn sets(&self) -> &[SetItem] {
        &self.sets
    }

    /// Append a blank set row
    ///
    /// No-op when the current last row is already blank. Returns the
    /// id of the new row, or `None` when nothing was added.
    pub fn add_blank_set(&mut self) -> Option<String> {
        if let Some(last) = self.sets.last() {
            if last.is_blank() {
                return None;
            }
        }
        let set = SetItem::blank();
        let id = set.id.clone();
        self.sets.push(set);
        Some(id)
    }

    /// Patch one draft row in place
    ///
    /// Returns false when no row matches `id`.
    pub fn update_set(&mut self, id: &str, apply: impl FnOnce(&mut SetItem)) -> bool {
        match self.sets.iter_mut().find(|s| s.id == id) {
            Some(set) => {
                apply(set);
                true
            }
            None => false,
        }
    }

    /// Remove one draft row
    ///
    /// Returns false when no row matches `id`.
    pub fn remove_set(&mut self, id: &str) -> bool {
        let before = self.sets.len();
        self.sets.retain(|s| s.id != id);
        self.sets.len() != before
    }

    /// Drop all rows (commit or discard)
    pub fn clear(&mut self) {
        self.sets.clear();
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// True when committing now would produce at least one set
    pub fn has_loggable_set(&self) -> bool {
        self.sets.iter().any(|s| !s.is_blank())
    }
}
