//! Read ("mastered") and starred flags, kept across reloads.
//!
//! Both sets are stored under their own key as a JSON array of ids, e.g.
//! `learn_read_ids = [3,1,7]`. Ids that are no longer in the catalog are kept as they are.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use stash::{DirtyTracker, KeyValueStore, load_json, save_json};

use crate::catalog::{QuestionId, QuestionRecord};

pub const READ_IDS_KEY: &str = "learn_read_ids";
pub const STARRED_IDS_KEY: &str = "learn_starred_ids";

pub type IdSet = IndexSet<QuestionId>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub read_ids: IdSet,
    pub starred_ids: IdSet,
}

fn toggle(set: &mut IdSet, id: &QuestionId) -> bool {
    if set.shift_remove(id) {
        false
    } else {
        set.insert(id.clone());
        true
    }
}

/// Anything that can answer and flip the per-question flags.
pub trait ProgressTracker {
    fn is_read(&self, id: &QuestionId) -> bool;
    fn is_starred(&self, id: &QuestionId) -> bool;
    /// Returns true if the id was not read before.
    fn mark_read(&mut self, id: &QuestionId) -> bool;
    /// Returns the new membership.
    fn toggle_read(&mut self, id: &QuestionId) -> bool;
    /// Returns the new membership.
    fn toggle_star(&mut self, id: &QuestionId) -> bool;
}

impl ProgressTracker for ProgressState {
    fn is_read(&self, id: &QuestionId) -> bool {
        self.read_ids.contains(id)
    }

    fn is_starred(&self, id: &QuestionId) -> bool {
        self.starred_ids.contains(id)
    }

    fn mark_read(&mut self, id: &QuestionId) -> bool {
        self.read_ids.insert(id.clone())
    }

    fn toggle_read(&mut self, id: &QuestionId) -> bool {
        toggle(&mut self.read_ids, id)
    }

    fn toggle_star(&mut self, id: &QuestionId) -> bool {
        toggle(&mut self.starred_ids, id)
    }
}

/// [`ProgressState`] plus the storage it is written back to after every change.
pub struct ProgressStore {
    state: DirtyTracker<ProgressState>,
    storage: Box<dyn KeyValueStore>,
}

impl ProgressStore {
    /// Never fails: missing or unreadable entries load as empty sets.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let state = ProgressState {
            read_ids: load_json(storage.as_ref(), READ_IDS_KEY),
            starred_ids: load_json(storage.as_ref(), STARRED_IDS_KEY),
        };
        log::debug!(
            "Loaded progress: {} read, {} starred",
            state.read_ids.len(),
            state.starred_ids.len()
        );
        Self {
            state: DirtyTracker::clean(state),
            storage,
        }
    }

    pub fn state(&self) -> &ProgressState {
        self.state.value()
    }

    /// Writes both complete sets. Failures are logged, not returned.
    pub fn save(&mut self) {
        let state = self.state.value();
        for (key, ids) in [
            (READ_IDS_KEY, &state.read_ids),
            (STARRED_IDS_KEY, &state.starred_ids),
        ] {
            if let Err(e) = save_json(self.storage.as_mut(), key, ids) {
                log::error!("Failed to persist {key}: {e}");
            }
        }
    }

    fn save_if_dirty(&mut self) {
        if self.state.take_dirty() {
            self.save();
        }
    }
}

impl ProgressTracker for ProgressStore {
    fn is_read(&self, id: &QuestionId) -> bool {
        self.state.value().is_read(id)
    }

    fn is_starred(&self, id: &QuestionId) -> bool {
        self.state.value().is_starred(id)
    }

    fn mark_read(&mut self, id: &QuestionId) -> bool {
        if self.is_read(id) {
            return false;
        }
        self.state.value_mut().mark_read(id);
        self.save_if_dirty();
        true
    }

    fn toggle_read(&mut self, id: &QuestionId) -> bool {
        let now_read = self.state.value_mut().toggle_read(id);
        self.save_if_dirty();
        now_read
    }

    fn toggle_star(&mut self, id: &QuestionId) -> bool {
        let now_starred = self.state.value_mut().toggle_star(id);
        self.save_if_dirty();
        now_starred
    }
}

/// The numbers shown above the question list for the active tab.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total: usize,
    pub mastered: usize,
    pub starred: usize,
    /// 0.0 ..= 100.0; zero for an empty tab
    pub mastered_percent: f64,
}

impl ProgressSummary {
    pub fn for_records<'a>(
        records: impl IntoIterator<Item = &'a QuestionRecord>,
        progress: &ProgressState,
    ) -> Self {
        let (mut total, mut mastered, mut starred) = (0, 0, 0);
        for record in records {
            total += 1;
            if progress.is_read(&record.id) {
                mastered += 1;
            }
            if progress.is_starred(&record.id) {
                starred += 1;
            }
        }
        let mastered_percent = if total == 0 {
            0.0
        } else {
            mastered as f64 / total as f64 * 100.0
        };
        Self {
            total,
            mastered,
            starred,
            mastered_percent,
        }
    }
}
