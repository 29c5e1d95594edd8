//! Sleep-night domain record and patch types.

use serde::{Deserialize, Serialize};

use crate::types::{EpochMs, NightId, Quality};

/// Fully materialized, authoritative sleep-night record.
///
/// A night whose end timestamp still equals its start timestamp is the
/// in-progress sentinel: tracking has started but not stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepNight {
    /// Stable night identifier.
    pub id: NightId,
    /// Tracking start, milliseconds since epoch.
    pub start_ms: EpochMs,
    /// Tracking end, milliseconds since epoch. Equal to `start_ms` while open.
    pub end_ms: EpochMs,
    /// User-selected quality rating.
    pub quality: Quality,
}

impl SleepNight {
    /// True while the night is still being tracked.
    pub fn is_in_progress(&self) -> bool {
        self.end_ms == self.start_ms
    }

    /// Tracked duration in milliseconds; zero while in progress.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Sparse patch where each `Some` field overwrites the record value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NightPatch {
    /// Optional replacement for the end timestamp.
    pub end_ms: Option<EpochMs>,
    /// Optional replacement for the quality rating.
    pub quality: Option<Quality>,
}

impl NightPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies this patch in place to `night`.
    pub fn apply_to(&self, night: &mut SleepNight) {
        if let Some(v) = self.end_ms {
            night.end_ms = v;
        }
        if let Some(v) = self.quality {
            night.quality = v;
        }
    }
}
