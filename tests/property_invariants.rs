use proptest::prelude::*;

use nightlog::{
    core::store::NightStore,
    engine::diff::{DiffItem, ListOp, reconcile},
    types::Quality,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Item {
    key: u32,
    val: u32,
}

impl DiffItem for Item {
    type Key = u32;

    fn key(&self) -> u32 {
        self.key
    }

    fn same_content(&self, other: &Self) -> bool {
        self == other
    }
}

fn apply_model(old: &[Item], new: &[Item], ops: &[ListOp]) -> Vec<Item> {
    let mut work = old.to_vec();
    for op in ops {
        match *op {
            ListOp::Remove { index } => {
                work.remove(index);
            }
            ListOp::Move { from, to } => {
                let moved = work.remove(from);
                work.insert(to, moved);
            }
            ListOp::Insert { index } => work.insert(index, new[index].clone()),
            ListOp::Update { index } => work[index] = new[index].clone(),
        }
    }
    work
}

/// Unique keys in random order, with content derived from a seed so a key's
/// content can differ between the two snapshots.
fn snapshot_strategy() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::hash_set(0u32..48, 0..24)
        .prop_map(|keys| keys.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
        .prop_flat_map(|keys| {
            let len = keys.len();
            (Just(keys), prop::collection::vec(0u32..3, len))
        })
        .prop_map(|(keys, vals)| {
            keys.into_iter()
                .zip(vals)
                .map(|(key, val)| Item { key, val })
                .collect()
        })
}

proptest! {
    #[test]
    fn edit_script_always_rebuilds_the_new_snapshot(
        old in snapshot_strategy(),
        new in snapshot_strategy(),
    ) {
        let ops = reconcile(&old, &new);
        prop_assert_eq!(apply_model(&old, &new, &ops), new.clone());

        // Survivors never degrade into remove+insert pairs: structural op
        // counts match the key-set difference exactly.
        let old_keys: Vec<u32> = old.iter().map(|i| i.key).collect();
        let new_keys: Vec<u32> = new.iter().map(|i| i.key).collect();
        let removed = old_keys.iter().filter(|k| !new_keys.contains(k)).count();
        let inserted = new_keys.iter().filter(|k| !old_keys.contains(k)).count();

        let remove_ops = ops.iter().filter(|op| matches!(op, ListOp::Remove { .. })).count();
        let insert_ops = ops.iter().filter(|op| matches!(op, ListOp::Insert { .. })).count();
        prop_assert_eq!(remove_ops, removed);
        prop_assert_eq!(insert_ops, inserted);
    }

    #[test]
    fn diff_against_self_is_always_empty(snapshot in snapshot_strategy()) {
        prop_assert!(reconcile(&snapshot, &snapshot).is_empty());
    }
}

#[derive(Debug, Clone)]
enum Action {
    Begin { ts: u16 },
    Close { ts: u16 },
    Rate { target: u8, quality: i64 },
    Clear,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u16..5000).prop_map(|ts| Action::Begin { ts }),
        (0u16..5000).prop_map(|ts| Action::Close { ts }),
        (0u8..24, -1i64..6).prop_map(|(target, quality)| Action::Rate { target, quality }),
        Just(Action::Clear),
    ]
}

proptest! {
    #[test]
    fn random_gestures_keep_at_most_one_open_night(
        actions in prop::collection::vec(action_strategy(), 1..200),
    ) {
        let mut store = NightStore::new();

        for action in actions {
            match action {
                Action::Begin { ts } => {
                    let _ = store.begin(u64::from(ts));
                }
                Action::Close { ts } => {
                    let _ = store.close_open(u64::from(ts));
                }
                Action::Rate { target, quality } => {
                    let nights = store.nights_desc();
                    if nights.is_empty() {
                        continue;
                    }
                    let id = nights[usize::from(target) % nights.len()].id;
                    let _ = store.set_quality(id, Quality::from_raw(quality));
                }
                Action::Clear => {
                    let _ = store.clear();
                }
            }

            let nights = store.nights_desc();
            let open_count = nights.iter().filter(|n| n.is_in_progress()).count();
            prop_assert!(open_count <= 1, "multiple open nights: {nights:?}");
            prop_assert_eq!(
                store.open_night().map(|n| n.id),
                nights.iter().find(|n| n.is_in_progress()).map(|n| n.id)
            );

            // Display order: newest start first, ties by newest id.
            for pair in nights.windows(2) {
                prop_assert!(
                    (pair[0].start_ms, pair[0].id) > (pair[1].start_ms, pair[1].id)
                );
            }
        }
    }
}
