//! One-shot navigation signals.
//!
//! A [`NavSignal`] represents "navigate now, to destination D" as observable
//! state with exactly two shapes: Idle (`None`) and Pending (`Some(D)`).
//! `request` arms it, `consume` atomically takes the destination and resets to
//! Idle, so replaying the latest value to a late or re-attached observer can
//! never double-fire a navigation. The same primitive backs every navigation
//! edge in the app.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::types::NightId;

/// Observable one-shot value consumed exactly once per request.
#[derive(Debug)]
pub struct NavSignal<D> {
    tx: watch::Sender<Option<D>>,
}

impl<D: Clone> NavSignal<D> {
    /// Creates a signal in the Idle state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Arms the signal: Idle → Pending(`dest`).
    ///
    /// A request on an already-pending signal overwrites the destination; the
    /// latest value wins, matching latest-value observer delivery.
    pub fn request(&self, dest: D) {
        self.tx.send_replace(Some(dest));
    }

    /// Takes the pending destination and resets to Idle.
    ///
    /// Returns `Some` exactly once per request. Consuming while Idle is a
    /// no-op that does not wake watchers.
    pub fn consume(&self) -> Option<D> {
        let mut taken = None;
        self.tx.send_if_modified(|slot| {
            taken = slot.take();
            taken.is_some()
        });
        taken
    }

    /// Non-consuming read of the current state, used for save/restore.
    pub fn pending(&self) -> Option<D> {
        self.tx.borrow().clone()
    }

    /// Subscribes an observer to state changes.
    ///
    /// The receiver sees the current value immediately, so a Pending signal
    /// saved and restored still fires once for the new observer.
    pub fn watch(&self) -> watch::Receiver<Option<D>> {
        self.tx.subscribe()
    }
}

impl<D: Clone> Default for NavSignal<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// The navigation edges and one-shot notices of the tracker app.
#[derive(Debug, Default)]
pub struct TrackerSignals {
    /// Tracker → quality screen, armed when tracking stops.
    pub to_quality: NavSignal<NightId>,
    /// Tracker → detail screen, armed when a list row is tapped.
    pub to_detail: NavSignal<NightId>,
    /// Quality or detail screen → back to the tracker.
    pub to_tracker: NavSignal<()>,
    /// "Log cleared" notice shown once after a clear.
    pub cleared_notice: NavSignal<()>,
}

impl TrackerSignals {
    /// All signals Idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures pending state for persistence across process death.
    pub fn snapshot(&self) -> SignalsSnapshotV1 {
        SignalsSnapshotV1 {
            to_quality: self.to_quality.pending(),
            to_detail: self.to_detail.pending(),
            to_tracker: self.to_tracker.pending().is_some(),
            cleared_notice: self.cleared_notice.pending().is_some(),
        }
    }

    /// Re-arms whatever was pending at snapshot time.
    ///
    /// Idle entries stay Idle, so a restore never replays an already-consumed
    /// navigation.
    pub fn restore(&self, snapshot: &SignalsSnapshotV1) {
        if let Some(id) = snapshot.to_quality {
            self.to_quality.request(id);
        }
        if let Some(id) = snapshot.to_detail {
            self.to_detail.request(id);
        }
        if snapshot.to_tracker {
            self.to_tracker.request(());
        }
        if snapshot.cleared_notice {
            self.cleared_notice.request(());
        }
    }
}

/// Serializable pending-signal state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalsSnapshotV1 {
    /// Pending tracker → quality destination.
    pub to_quality: Option<NightId>,
    /// Pending tracker → detail destination.
    pub to_detail: Option<NightId>,
    /// True when a back-to-tracker navigation was pending.
    pub to_tracker: bool,
    /// True when the cleared notice was pending.
    pub cleared_notice: bool,
}

impl SignalsSnapshotV1 {
    /// True when nothing was pending.
    pub fn is_idle(&self) -> bool {
        self == &Self::default()
    }
}
