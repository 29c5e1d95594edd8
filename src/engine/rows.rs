//! Display-row model for the sleep list.
//!
//! The rendered list is the night log plus one synthetic header row pinned at
//! the top. The header carries its own constant identity key so reconciliation
//! treats it as a stable item instead of churning it on every snapshot.

use crate::{
    engine::diff::{DiffItem, ListOp},
    night::SleepNight,
    types::NightId,
};

/// Identity key of a rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// The one synthetic header row.
    Header,
    /// A data row, keyed by its night id.
    Night(NightId),
}

/// Rendered row variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Synthetic layout header ahead of the data rows.
    Header,
    /// One sleep-night data row.
    Night(SleepNight),
}

impl Row {
    /// Identity key for diffing.
    pub fn key(&self) -> RowKey {
        match self {
            Row::Header => RowKey::Header,
            Row::Night(night) => RowKey::Night(night.id),
        }
    }

    /// The backing night for data rows.
    pub fn night(&self) -> Option<&SleepNight> {
        match self {
            Row::Header => None,
            Row::Night(night) => Some(night),
        }
    }
}

impl DiffItem for Row {
    type Key = RowKey;

    fn key(&self) -> RowKey {
        Row::key(self)
    }

    fn same_content(&self, other: &Self) -> bool {
        self == other
    }
}

/// Builds the rendered sequence: header first, then the nights as given.
///
/// Callers pass nights already in display order.
pub fn with_header(nights: &[SleepNight]) -> Vec<Row> {
    let mut rows = Vec::with_capacity(nights.len() + 1);
    rows.push(Row::Header);
    rows.extend(nights.iter().cloned().map(Row::Night));
    rows
}

/// Render target the edit script is applied against.
///
/// One implementation per rendering surface; the engine never touches a view
/// directly. `rebind` re-binds changed content in place, `relocate` moves a
/// bound row without re-binding it.
pub trait RowTarget {
    /// Materialize `row` at `index`.
    fn insert(&mut self, index: usize, row: &Row);
    /// Tear down the row at `index`.
    fn remove(&mut self, index: usize);
    /// Move a bound row from `from` to `to` without re-binding.
    fn relocate(&mut self, from: usize, to: usize);
    /// Re-bind the row at `index` with fresh content.
    fn rebind(&mut self, index: usize, row: &Row);
}

/// Drives `target` through an edit script produced by
/// [`crate::engine::diff::reconcile`] against the same `new` snapshot.
pub fn apply_ops<T: RowTarget>(target: &mut T, ops: &[ListOp], new: &[Row]) {
    for op in ops {
        match *op {
            ListOp::Remove { index } => target.remove(index),
            ListOp::Move { from, to } => target.relocate(from, to),
            ListOp::Insert { index } => {
                if let Some(row) = new.get(index) {
                    target.insert(index, row);
                }
            }
            ListOp::Update { index } => {
                if let Some(row) = new.get(index) {
                    target.rebind(index, row);
                }
            }
        }
    }
}
