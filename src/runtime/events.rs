//! Runtime event stream payloads.

use crate::types::NightId;

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// Tracking started; a new in-progress night exists.
    Started {
        /// Created night id.
        id: NightId,
    },
    /// Tracking stopped; the night's end timestamp is set.
    Stopped {
        /// Closed night id.
        id: NightId,
    },
    /// A quality rating was recorded.
    QualityRated {
        /// Rated night id.
        id: NightId,
    },
    /// The whole log was cleared.
    Cleared {
        /// Number of nights removed.
        removed: usize,
    },
}
