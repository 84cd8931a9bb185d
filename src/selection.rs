//! Selection state
//!
//! Selections are keyed by candidate identity, so they survive any number
//! of re-rankings. Bulk operations only touch what the current ranked list
//! shows.

use crate::store::CandidateStore;
use crate::types::{CandidateId, RankedList};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    states: HashMap<CandidateId, bool>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select candidates flagged `enabled`, unless their state is already known.
    pub fn seed_enabled<T>(&mut self, store: &CandidateStore<T>) {
        for candidate in store.iter().filter(|candidate| candidate.enabled) {
            self.states.entry(candidate.id.clone()).or_insert(true);
        }
    }

    /// Flip one candidate; returns the new state.
    pub fn toggle(&mut self, id: &CandidateId) -> bool {
        let state = self.states.entry(id.clone()).or_insert(false);
        *state = !*state;
        *state
    }

    pub fn set(&mut self, id: &CandidateId, selected: bool) {
        self.states.insert(id.clone(), selected);
    }

    pub fn is_selected(&self, id: &CandidateId) -> bool {
        self.states.get(id).copied().unwrap_or(false)
    }

    /// Apply to every candidate of `ranked`; `None` inverts each one.
    pub fn set_all(&mut self, ranked: &RankedList, value: Option<bool>) {
        for id in ranked.ids() {
            match value {
                Some(selected) => self.set(id, selected),
                None => {
                    self.toggle(id);
                }
            }
        }
    }

    pub fn selected(&self) -> HashSet<CandidateId> {
        self.states
            .iter()
            .filter(|(_, &selected)| selected)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.states.values().filter(|&&selected| selected).count()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

/// Highlighted row of the current ranked list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move by `delta` rows within a list of `len` rows.
    pub fn move_by(&mut self, delta: isize, len: usize, cycle: bool) {
        if len == 0 {
            self.index = 0;
            return;
        }
        let len = len as isize;
        let target = self.index as isize + delta;
        self.index = if cycle {
            target.rem_euclid(len) as usize
        } else {
            target.clamp(0, len - 1) as usize
        };
    }

    /// Keep the cursor inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
