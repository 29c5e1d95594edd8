//! SQLite-backed sleep-night DAO.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use crate::{
    night::SleepNight,
    signal::SignalsSnapshotV1,
    types::{NightId, Quality},
};

use super::{NightDao, PersistError, PersistResult};

const SIGNALS_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SignalsEnvelope {
    format_version: u16,
    signals: SignalsSnapshotV1,
}

/// SQLite implementation of [`crate::persist::NightDao`].
pub struct SqliteNightDao {
    conn: Connection,
}

impl SqliteNightDao {
    /// Opens or creates the database at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory database, mainly for tests.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }
}

impl NightDao for SqliteNightDao {
    fn insert(&mut self, night: &SleepNight) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO sleep_night(night_id, start_ms, end_ms, quality) VALUES (?1, ?2, ?3, ?4)",
            params![
                night.id as i64,
                night.start_ms as i64,
                night.end_ms as i64,
                night.quality.as_raw(),
            ],
        )?;
        Ok(())
    }

    fn update(&mut self, night: &SleepNight) -> PersistResult<()> {
        let changed = self.conn.execute(
            "UPDATE sleep_night SET start_ms = ?2, end_ms = ?3, quality = ?4 WHERE night_id = ?1",
            params![
                night.id as i64,
                night.start_ms as i64,
                night.end_ms as i64,
                night.quality.as_raw(),
            ],
        )?;
        if changed == 0 {
            return Err(PersistError::Message(format!(
                "update of missing night {}",
                night.id
            )));
        }
        Ok(())
    }

    fn fetch_all(&self) -> PersistResult<Vec<SleepNight>> {
        let mut stmt = self.conn.prepare(
            "SELECT night_id, start_ms, end_ms, quality FROM sleep_night \
             ORDER BY start_ms DESC, night_id DESC",
        )?;
        let rows = stmt.query_map([], night_from_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn fetch_open(&self) -> PersistResult<Option<SleepNight>> {
        let night = self
            .conn
            .query_row(
                "SELECT night_id, start_ms, end_ms, quality FROM sleep_night \
                 WHERE end_ms = start_ms ORDER BY night_id DESC LIMIT 1",
                [],
                night_from_row,
            )
            .optional()?;
        Ok(night)
    }

    fn clear_all(&mut self) -> PersistResult<usize> {
        let removed = self.conn.execute("DELETE FROM sleep_night", [])?;
        Ok(removed)
    }

    fn save_signals(&mut self, snapshot: &SignalsSnapshotV1) -> PersistResult<()> {
        let env = SignalsEnvelope {
            format_version: SIGNALS_FORMAT_VERSION,
            signals: snapshot.clone(),
        };
        let payload = serde_json::to_vec(&env)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO ui_state(id, ts_ms, payload) VALUES (1, ?1, ?2)",
            params![now_ms() as i64, payload],
        )?;
        Ok(())
    }

    fn load_signals(&self) -> PersistResult<Option<SignalsSnapshotV1>> {
        let payload: Option<Vec<u8>> = self
            .conn
            .query_row("SELECT payload FROM ui_state WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let env: SignalsEnvelope = serde_json::from_slice(&payload)?;
        if env.format_version != SIGNALS_FORMAT_VERSION {
            return Err(PersistError::Message(
                "unsupported ui_state format".to_string(),
            ));
        }
        Ok(Some(env.signals))
    }
}

fn night_from_row(row: &Row<'_>) -> rusqlite::Result<SleepNight> {
    let id: i64 = row.get(0)?;
    let start_ms: i64 = row.get(1)?;
    let end_ms: i64 = row.get(2)?;
    let quality: i64 = row.get(3)?;
    Ok(SleepNight {
        id: id as NightId,
        start_ms: start_ms as u64,
        end_ms: end_ms as u64,
        quality: Quality::from_raw(quality),
    })
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
