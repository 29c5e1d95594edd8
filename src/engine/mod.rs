//! List reconciliation between successive sleep-log snapshots.

/// Keyed diff producing a structural edit script.
pub mod diff;
/// Display-row model and edit-script application seam.
pub mod rows;
