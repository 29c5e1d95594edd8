//! In-memory authoritative store.

/// Authoritative sleep-night store and open-session tracking.
pub mod store;
