//! Keyed list diff.
//!
//! [`reconcile`] compares two immutable snapshots of an ordered sequence and
//! emits the structural edits that turn a view bound to the old snapshot into
//! one bound to the new snapshot, without rebuilding unaffected rows. Items
//! are matched by identity key, so an item that merely changed position
//! becomes a [`ListOp::Move`] and never a remove+insert pair; an item whose
//! key survived but whose content changed becomes a [`ListOp::Update`].
//!
//! Identity keys are assumed unique within each snapshot. Duplicate keys are a
//! contract violation; the diff stays panic-free on them but makes no claim
//! about the resulting edit script.

use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

/// Item that can be matched across snapshots.
pub trait DiffItem {
    /// Stable identity used to match rows between snapshots.
    type Key: Clone + Eq + Hash;

    /// Identity key; equal keys mean "the same logical row".
    fn key(&self) -> Self::Key;

    /// Full content equality; `false` forces an in-place update.
    fn same_content(&self, other: &Self) -> bool;
}

/// One structural edit against the rendered list.
///
/// Edits apply sequentially: each index is valid against the list as left by
/// the edits before it. `Move` removes at `from` and reinserts at `to` in the
/// shortened list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOp {
    /// Insert the new snapshot's row at `index`.
    Insert {
        /// Position in the list being built, equal to the row's final index.
        index: usize,
    },
    /// Remove the row at `index`.
    Remove {
        /// Position of the doomed row at application time.
        index: usize,
    },
    /// Relocate a surviving row.
    Move {
        /// Current position of the row.
        from: usize,
        /// Position after reinsertion.
        to: usize,
    },
    /// Re-bind changed content in place.
    Update {
        /// Final position of the changed row.
        index: usize,
    },
}

/// Diffs `old` against `new`, returning the edit script.
///
/// Emission order: removals (descending index), moves of out-of-order
/// survivors (descending target), inserts (ascending index), then content
/// updates at final indices. Diffing a snapshot against itself yields an
/// empty script.
///
/// Move minimality comes from a longest-increasing-run anchor set over the
/// survivors' target positions: for unique keys that run is exactly the
/// longest common subsequence of the two snapshots, so only items that truly
/// broke relative order are moved. Cost is O(n log n) plus O(n) per emitted
/// move; an unchanged ordering costs no moves at all.
pub fn reconcile<T: DiffItem>(old: &[T], new: &[T]) -> Vec<ListOp> {
    let mut new_pos: HashMap<T::Key, usize> = HashMap::with_capacity(new.len());
    for (j, item) in new.iter().enumerate() {
        new_pos.insert(item.key(), j);
    }
    let mut old_pos: HashMap<T::Key, usize> = HashMap::with_capacity(old.len());
    for (i, item) in old.iter().enumerate() {
        old_pos.insert(item.key(), i);
    }

    let mut ops = Vec::new();

    // Removals from the back so earlier indices stay valid.
    for (i, item) in old.iter().enumerate().rev() {
        if !new_pos.contains_key(&item.key()) {
            ops.push(ListOp::Remove { index: i });
        }
    }

    // Survivors as their target positions in `new`, still in old order.
    let kept: Vec<usize> = old
        .iter()
        .filter_map(|item| new_pos.get(&item.key()).copied())
        .collect();

    // Anchors already share the new relative order and stay put. Everything
    // else is placed explicitly, walking targets from the back so the settled
    // tail never shifts under a move.
    let anchors = increasing_run(&kept);
    let mut cur = kept.clone();
    let mut targets = kept.clone();
    targets.sort_unstable();

    for (t, &v) in targets.iter().enumerate().rev() {
        if anchors.contains(&v) {
            continue;
        }
        let Some(from) = cur.iter().position(|&x| x == v) else {
            continue;
        };
        if from == t {
            continue;
        }
        ops.push(ListOp::Move { from, to: t });
        let moved = cur.remove(from);
        cur.insert(t, moved);
    }

    // Inserts ascending: every final position below the insertion point is
    // already materialized by the phases above.
    for (j, item) in new.iter().enumerate() {
        if !old_pos.contains_key(&item.key()) {
            ops.push(ListOp::Insert { index: j });
        }
    }

    // Content updates against the final arrangement.
    for (j, item) in new.iter().enumerate() {
        if let Some(&i) = old_pos.get(&item.key())
            && !old[i].same_content(item)
        {
            ops.push(ListOp::Update { index: j });
        }
    }

    ops
}

/// Values on one longest strictly-increasing subsequence of `seq`.
///
/// Patience algorithm; `seq` holds distinct values when keys are unique.
fn increasing_run(seq: &[usize]) -> HashSet<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (i, &v) in seq.iter().enumerate() {
        let pos = tails.partition_point(|&ti| seq[ti] < v);
        if pos > 0 {
            prev[i] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut run = HashSet::new();
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        run.insert(seq[i]);
        cursor = prev[i];
    }
    run
}
