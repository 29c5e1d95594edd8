//! Persistence seam between the runtime and durable storage.

/// SQLite-backed [`NightDao`] implementation.
pub mod sqlite;

use crate::{night::SleepNight, signal::SignalsSnapshotV1};

/// Persistence-layer failure cases.
#[derive(Debug)]
pub enum PersistError {
    /// Underlying SQLite error.
    Sqlite(rusqlite::Error),
    /// Payload (de)serialization error.
    Serde(serde_json::Error),
    /// Anything else, described.
    Message(String),
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Shorthand result for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Data-access surface for the sleep log.
///
/// Mirrors the store's gesture operations one to one; each method is a single
/// atomic statement, so a failed call needs no rollback. Implementations run
/// on the blocking worker context, never on the runtime's writer task.
pub trait NightDao: Send {
    /// Persists a newly created night.
    fn insert(&mut self, night: &SleepNight) -> PersistResult<()>;
    /// Rewrites an existing night after stop or quality selection.
    fn update(&mut self, night: &SleepNight) -> PersistResult<()>;
    /// Loads every night in display order (newest start first).
    fn fetch_all(&self) -> PersistResult<Vec<SleepNight>>;
    /// Loads the in-progress night, if one exists.
    fn fetch_open(&self) -> PersistResult<Option<SleepNight>>;
    /// Deletes every night; returns the removed count.
    fn clear_all(&mut self) -> PersistResult<usize>;

    /// Persists pending navigation state across process death.
    fn save_signals(&mut self, _snapshot: &SignalsSnapshotV1) -> PersistResult<()> {
        Ok(())
    }

    /// Loads the pending navigation state saved by [`NightDao::save_signals`].
    fn load_signals(&self) -> PersistResult<Option<SignalsSnapshotV1>> {
        Ok(None)
    }
}
