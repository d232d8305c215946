//! Main store implementation.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use odo_types::OdometerSample;

use crate::error::{Error, Result};
use crate::schema;

/// Fixed key under which the odometer sample log is stored as one JSON blob.
pub const ODOMETER_LOG_KEY: &str = "odometer_log";

/// SQLite-backed local store for data that never touches the remote table.
pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening local store at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Load the odometer sample log.
    ///
    /// The log is ordered oldest-first as persisted; an absent blob reads as
    /// an empty log.
    pub fn load_odometer_log(&self) -> Result<Vec<OdometerSample>> {
        let blob: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?",
                [ODOMETER_LOG_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match blob {
            Some(json) => {
                let samples: Vec<OdometerSample> = serde_json::from_str(&json)?;
                debug!("Loaded {} odometer samples", samples.len());
                Ok(samples)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Persist the full odometer sample log, replacing the previous blob.
    pub fn save_odometer_log(&self, samples: &[OdometerSample]) -> Result<()> {
        let json = serde_json::to_string(samples)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            rusqlite::params![ODOMETER_LOG_KEY, json],
        )?;

        debug!("Saved {} odometer samples", samples.len());
        Ok(())
    }

    /// Drop the persisted sample log (used by a full reset).
    pub fn clear_odometer_log(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?", [ODOMETER_LOG_KEY])?;
        Ok(())
    }
}
