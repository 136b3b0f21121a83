//! Bounded, ordered peer selection.

use autohost_core::{Peer, PeerId};
use serde::Serialize;

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The selection was full; nothing changed.
    Rejected,
}

impl ToggleOutcome {
    /// Whether the selection was mutated.
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Ordered set of selected peer ids, never longer than `cap`.
///
/// Insertion order is rotation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionStore {
    ids: Vec<PeerId>,
    cap: usize,
}

impl SelectionStore {
    pub fn new(cap: usize) -> Self {
        Self {
            ids: Vec::new(),
            cap,
        }
    }

    /// Rebuild from persisted ids, dropping duplicates and overflow.
    pub fn from_ids(ids: &[PeerId], cap: usize) -> Self {
        let mut store = Self::new(cap);
        for id in ids {
            if store.ids.len() < cap && !store.ids.contains(id) {
                store.ids.push(*id);
            }
        }
        store
    }

    /// Remove `id` if selected, otherwise append it when there is room.
    pub fn toggle(&mut self, id: PeerId) -> ToggleOutcome {
        if let Some(pos) = self.ids.iter().position(|selected| *selected == id) {
            self.ids.remove(pos);
            ToggleOutcome::Removed
        } else if self.ids.len() < self.cap {
            self.ids.push(id);
            ToggleOutcome::Added
        } else {
            ToggleOutcome::Rejected
        }
    }

    pub fn reset(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &[PeerId] {
        &self.ids
    }

    pub fn contains(&self, id: PeerId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= self.cap
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Resolve selected ids against the directory, in selection order.
    /// Ids missing from the directory are skipped.
    pub fn snapshot(&self, directory: &[Peer]) -> Vec<Peer> {
        self.ids
            .iter()
            .filter_map(|id| directory.iter().find(|peer| peer.id == *id).cloned())
            .collect()
    }
}
