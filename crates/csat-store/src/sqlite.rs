// ABOUTME: SQLite-backed response store implementing the same contract as the JSON-file store.
// ABOUTME: One table, AUTOINCREMENT ids, derived views computed by the shared core functions.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use csat_core::record::{TIMESTAMP_FORMAT, now_timestamp};
use csat_core::{NewResponse, Record, Stats, StorageInfo, export_csv};
use rusqlite::{Connection, params};

use crate::backend::{ResponseStore, StoreError};

const STORAGE_TYPE: &str = "SQLite Storage";

/// Response store backed by a single SQLite database file.
pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at `path`, creating parent directories
    /// and the schema if needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::StorageUnavailable {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let path = std::path::absolute(path).map_err(|source| StoreError::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS csat_response (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                rating INTEGER NOT NULL,
                context TEXT NOT NULL DEFAULT '',
                comment TEXT NOT NULL DEFAULT '',
                timestamp TEXT NOT NULL
            );",
        )?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn query_records(conn: &Connection, order: &str) -> Result<Vec<Record>, StoreError> {
        let sql = format!(
            "SELECT id, rating, context, comment, timestamp FROM csat_response ORDER BY {}",
            order
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt.query_map([], |row| {
            Ok(Record {
                id: row.get::<_, i64>(0)? as u64,
                rating: row.get(1)?,
                context: row.get(2)?,
                comment: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Records in insertion order, the shape the core derivations expect.
    fn insertion_order(conn: &Connection) -> Result<Vec<Record>, StoreError> {
        Self::query_records(conn, "id ASC")
    }
}

impl ResponseStore for SqliteStore {
    fn add(&self, response: NewResponse) -> Result<u64, StoreError> {
        let conn = self.lock();
        let timestamp = now_timestamp();

        conn.execute(
            "INSERT INTO csat_response (rating, context, comment, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                response.rating,
                response.context.unwrap_or_default(),
                response.comment.unwrap_or_default(),
                timestamp,
            ],
        )?;

        let id = conn.last_insert_rowid() as u64;
        tracing::debug!("added response {} to {}", id, self.path.display());
        Ok(id)
    }

    fn list(&self) -> Result<Vec<Record>, StoreError> {
        Self::query_records(&self.lock(), "timestamp DESC, id DESC")
    }

    fn stats(&self) -> Result<Stats, StoreError> {
        Ok(Stats::compute(&Self::insertion_order(&self.lock())?))
    }

    fn export_csv(&self) -> Result<String, StoreError> {
        Ok(export_csv(&Self::insertion_order(&self.lock())?))
    }

    fn info(&self) -> Result<StorageInfo, StoreError> {
        let conn = self.lock();
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM csat_response", [], |row| row.get(0))?;

        let meta = fs::metadata(&self.path).ok();
        let last_modified = meta
            .as_ref()
            .and_then(|m| m.modified().ok())
            .map(|t| DateTime::<Utc>::from(t).format(TIMESTAMP_FORMAT).to_string());

        Ok(StorageInfo {
            storage_type: STORAGE_TYPE.to_string(),
            storage_location: self.path.display().to_string(),
            backup_location: None,
            total_records: total as usize,
            file_exists: meta.is_some(),
            backup_exists: false,
            file_size: meta.as_ref().map(|m| m.len()),
            last_modified,
        })
    }
}
