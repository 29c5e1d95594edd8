//! Authoritative in-memory night store.
//!
//! The store owns every [`SleepNight`] plus the open-session marker. It is the
//! single source of truth inside the runtime actor; a [`crate::persist::NightDao`]
//! mirrors it when persistence is configured. At most one night may sit in the
//! in-progress sentinel state (`end_ms == start_ms`) at any time.

use hashbrown::HashMap;

use crate::{
    night::{NightPatch, SleepNight},
    types::{EpochMs, NightId, Quality},
};

/// Store-level failure cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No night exists with the given id.
    MissingNight(NightId),
    /// A tracking session is already open under the given id.
    SessionAlreadyOpen(NightId),
}

/// In-memory sleep log with monotonic id assignment.
#[derive(Debug)]
pub struct NightStore {
    records: HashMap<NightId, SleepNight>,
    order: Vec<NightId>,
    open: Option<NightId>,
    next_id: NightId,
}

impl Default for NightStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NightStore {
    /// Creates an empty store starting at id 1.
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            open: None,
            next_id: 1,
        }
    }

    /// Rebuilds a store from previously persisted nights.
    ///
    /// Input order does not matter. If corrupt data carries more than one
    /// in-progress night, the newest one becomes the open marker; duplicates
    /// of an id keep the first occurrence.
    pub fn from_nights(nights: Vec<SleepNight>) -> Self {
        let mut store = Self::new();
        let mut sorted = nights;
        sorted.sort_by_key(|n| n.id);

        for night in sorted {
            if store.records.contains_key(&night.id) {
                continue;
            }
            store.next_id = store.next_id.max(night.id.saturating_add(1));
            if night.is_in_progress() {
                store.open = Some(night.id);
            }
            store.order.push(night.id);
            store.records.insert(night.id, night);
        }

        store
    }

    /// Opens a new tracking session at `start_ms`.
    ///
    /// Fails when a session is already open; the caller decides whether that
    /// is an error or a no-op.
    pub fn begin(&mut self, start_ms: EpochMs) -> Result<SleepNight, StoreError> {
        if let Some(open_id) = self.open {
            return Err(StoreError::SessionAlreadyOpen(open_id));
        }

        let id = self.next_id;
        self.next_id += 1;

        let night = SleepNight {
            id,
            start_ms,
            end_ms: start_ms,
            quality: Quality::Unrated,
        };

        self.open = Some(id);
        self.order.push(id);
        self.records.insert(id, night.clone());
        Ok(night)
    }

    /// Closes the open session at `end_ms`, returning the closed night.
    ///
    /// Returns `None` when nothing is open. The stored end timestamp is forced
    /// at least one millisecond past the start so the record leaves the
    /// in-progress sentinel state even if the clock has not advanced.
    pub fn close_open(&mut self, end_ms: EpochMs) -> Option<SleepNight> {
        let id = self.open?;
        let start_ms = self.records.get(&id)?.start_ms;
        let end_ms = end_ms.max(start_ms.saturating_add(1));

        let patch = NightPatch {
            end_ms: Some(end_ms),
            ..NightPatch::default()
        };
        self.patch(id, &patch).ok()
    }

    /// Records the selected quality rating for `id`.
    pub fn set_quality(&mut self, id: NightId, quality: Quality) -> Result<SleepNight, StoreError> {
        let patch = NightPatch {
            quality: Some(quality),
            ..NightPatch::default()
        };
        self.patch(id, &patch)
    }

    /// Applies a sparse patch to `id`, returning the updated night.
    ///
    /// Keeps the open-session marker consistent when the patch moves a night
    /// into or out of the in-progress state.
    pub fn patch(&mut self, id: NightId, patch: &NightPatch) -> Result<SleepNight, StoreError> {
        let night = self
            .records
            .get_mut(&id)
            .ok_or(StoreError::MissingNight(id))?;
        patch.apply_to(night);
        let updated = night.clone();

        if updated.is_in_progress() {
            self.open = Some(id);
        } else if self.open == Some(id) {
            self.open = None;
        }

        Ok(updated)
    }

    /// Looks up a night by id.
    pub fn night(&self, id: NightId) -> Option<&SleepNight> {
        self.records.get(&id)
    }

    /// Cloning lookup for hand-off across channels.
    pub fn night_cloned(&self, id: NightId) -> Option<SleepNight> {
        self.night(id).cloned()
    }

    /// The currently open night, if tracking is active.
    pub fn open_night(&self) -> Option<&SleepNight> {
        self.open.and_then(|id| self.records.get(&id))
    }

    /// All nights in display order: newest start first, ties by newest id.
    pub fn nights_desc(&self) -> Vec<SleepNight> {
        let mut out: Vec<SleepNight> = self
            .order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect();
        out.sort_by(|a, b| b.start_ms.cmp(&a.start_ms).then(b.id.cmp(&a.id)));
        out
    }

    /// Removes every night and the open marker; returns the removed count.
    pub fn clear(&mut self) -> usize {
        let removed = self.order.len();
        self.records.clear();
        self.order.clear();
        self.open = None;
        removed
    }

    /// Number of recorded nights.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the log holds no nights.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
