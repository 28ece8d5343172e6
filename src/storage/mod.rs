//! Persistent play history using SQLite (rusqlite)
//!
//! This module provides:
//! - OS-standard data directory location (via `directories` crate)
//! - SQLite database with schema versioning
//! - Append-only log of play records with versioned JSON payloads

use crate::config::APP_NAME;
use crate::game::Difficulty;
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Current schema version. Bump this when making schema changes.
const SCHEMA_VERSION: u32 = 1;

/// Payload version written into every record. Readers ignore unknown fields.
pub const PAYLOAD_VERSION: u32 = 1;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("could not determine data directory")]
    NoDataDirectory,
    #[error("failed to create data directory: {0}")]
    CreateDirFailed(#[source] std::io::Error),
    #[error("database schema version {found} is newer than supported version {supported}")]
    FutureSchemaVersion { found: u32, supported: u32 },
    #[error("invalid record payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Something that happened during play, as stored in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayRecord {
    SessionStart {
        difficulty: Difficulty,
    },
    WordSolved {
        word: String,
        points: u32,
        /// Incorrect attempts before the correct one, plus one.
        attempts: u32,
    },
    WordSkipped {
        word: String,
    },
    WordMissed {
        word: String,
        attempt: String,
    },
    SessionEnd {
        difficulty: Difficulty,
        score: u32,
        solved: u32,
        skipped: u32,
        misses: u32,
        /// True when the word list ran out rather than the player quitting.
        completed: bool,
    },
}

impl PlayRecord {
    /// Value of the `event_type` column.
    pub fn kind(&self) -> &'static str {
        match self {
            PlayRecord::SessionStart { .. } => "session_start",
            PlayRecord::WordSolved { .. } => "word_solved",
            PlayRecord::WordSkipped { .. } => "word_skipped",
            PlayRecord::WordMissed { .. } => "word_missed",
            PlayRecord::SessionEnd { .. } => "session_end",
        }
    }
}

#[derive(Serialize, Deserialize)]
struct VersionedPayload {
    v: u32,
    #[serde(flatten)]
    record: PlayRecord,
}

/// A record read back from the log.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub seq: i64,
    pub created_at: i64,
    pub record: PlayRecord,
}

/// The main storage handle.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create the database in the OS-standard data directory.
    ///
    /// - Linux: `$XDG_DATA_HOME/letterdrop/` or `~/.local/share/letterdrop/`
    /// - macOS: `~/Library/Application Support/letterdrop/`
    pub fn open() -> Result<Self, StorageError> {
        let data_dir = Self::data_dir()?;
        std::fs::create_dir_all(&data_dir).map_err(StorageError::CreateDirFailed)?;
        Self::open_at(&data_dir.join("letterdrop.db"))
    }

    /// Open or create the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let storage = Storage { conn };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let storage = Storage {
            conn: Connection::open_in_memory()?,
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Get the OS-standard data directory.
    pub fn data_dir() -> Result<PathBuf, StorageError> {
        ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(StorageError::NoDataDirectory)
    }

    /// Append a record; the sequence number is assigned by SQLite.
    pub fn append(&self, record: &PlayRecord) -> Result<StoredRecord, StorageError> {
        let created_at = now_ms();
        let payload = serde_json::to_string(&VersionedPayload {
            v: PAYLOAD_VERSION,
            record: record.clone(),
        })?;
        self.conn.execute(
            "INSERT INTO events (event_type, payload, created_at) VALUES (?1, ?2, ?3)",
            params![record.kind(), payload, created_at],
        )?;
        Ok(StoredRecord {
            seq: self.conn.last_insert_rowid(),
            created_at,
            record: record.clone(),
        })
    }

    /// All records in log order. Payloads that no longer parse are skipped.
    pub fn records(&self) -> Result<Vec<StoredRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT seq, payload, created_at FROM events ORDER BY seq")?;
        let rows = stmt.query_map([], |row| {
            let seq: i64 = row.get(0)?;
            let payload: String = row.get(1)?;
            let created_at: i64 = row.get(2)?;
            Ok((seq, payload, created_at))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (seq, payload, created_at) = row?;
            match serde_json::from_str::<VersionedPayload>(&payload) {
                Ok(parsed) => records.push(StoredRecord {
                    seq,
                    created_at,
                    record: parsed.record,
                }),
                Err(e) => warn!(seq, error = %e, "skipping unreadable record"),
            }
        }
        Ok(records)
    }

    /// Get the total number of records in the log.
    pub fn record_count(&self) -> Result<i64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }

    // Private helper methods

    fn initialize_schema(&self) -> Result<(), StorageError> {
        let current_version = self.get_schema_version()?;
        if current_version == 0 {
            self.create_schema_v1()?;
        } else if current_version > SCHEMA_VERSION {
            return Err(StorageError::FutureSchemaVersion {
                found: current_version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    fn get_schema_version(&self) -> Result<u32, StorageError> {
        let table_exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get(0),
        )?;
        if !table_exists {
            return Ok(0);
        }
        let version: u32 = self
            .conn
            .query_row("SELECT schema_version FROM meta LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);
        Ok(version)
    }

    fn create_schema_v1(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            -- Meta table: schema version
            CREATE TABLE meta (
                schema_version INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            -- Events table: append-only play log
            CREATE TABLE events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                event_type TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX idx_events_type ON events (event_type);
            "#,
        )?;
        self.conn.execute(
            "INSERT INTO meta (schema_version, created_at) VALUES (?1, ?2)",
            params![SCHEMA_VERSION, now_ms()],
        )?;
        Ok(())
    }

    #[cfg(test)]
    fn set_schema_version(&self, version: u32) -> Result<(), StorageError> {
        self.conn
            .execute("UPDATE meta SET schema_version = ?1", params![version])?;
        Ok(())
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_creation() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.record_count().unwrap(), 0);
        assert_eq!(storage.get_schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_meta_columns() {
        let storage = Storage::open_in_memory().unwrap();
        let mut stmt = storage.conn.prepare("PRAGMA table_info(meta)").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(columns, vec!["schema_version", "created_at"]);
    }

    #[test]
    fn test_append_and_read_back() {
        let storage = Storage::open_in_memory().unwrap();
        let first = storage
            .append(&PlayRecord::SessionStart {
                difficulty: Difficulty::Medium,
            })
            .unwrap();
        let second = storage
            .append(&PlayRecord::WordSolved {
                word: "plant".into(),
                points: 50,
                attempts: 2,
            })
            .unwrap();
        assert!(second.seq > first.seq);

        let records = storage.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record, first.record);
        assert_eq!(records[1].record, second.record);
    }

    #[test]
    fn test_payload_carries_version_and_kind() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .append(&PlayRecord::WordSkipped { word: "frog".into() })
            .unwrap();
        let (kind, payload): (String, String) = storage
            .conn
            .query_row("SELECT event_type, payload FROM events", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(kind, "word_skipped");
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json["v"], 1);
        assert_eq!(json["type"], "word_skipped");
        assert_eq!(json["word"], "frog");
    }

    #[test]
    fn test_unreadable_payload_is_skipped() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO events (event_type, payload, created_at) VALUES ('junk', '{not json', 0)",
                [],
            )
            .unwrap();
        storage
            .append(&PlayRecord::WordSkipped { word: "frog".into() })
            .unwrap();
        assert_eq!(storage.record_count().unwrap(), 2);
        assert_eq!(storage.records().unwrap().len(), 1);
    }

    #[test]
    fn test_future_schema_rejected() {
        let storage = Storage::open_in_memory().unwrap();
        storage.set_schema_version(SCHEMA_VERSION + 1).unwrap();
        assert!(matches!(
            storage.initialize_schema(),
            Err(StorageError::FutureSchemaVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn test_data_dir() {
        // Should not panic, may fail on some CI systems without home dir
        if let Ok(dir) = Storage::data_dir() {
            assert!(dir.to_string_lossy().contains("letterdrop"));
        }
    }
}
