// ABOUTME: Backend selection for the csatd storage directory.
// ABOUTME: Maps a configured backend name to a constructed ResponseStore rooted in the home directory.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::backend::{ResponseStore, StoreError};
use crate::json_file::JsonFileStore;
use crate::sqlite::SqliteStore;

/// File name of the SQLite database inside the storage directory.
pub const SQLITE_FILE: &str = "csat.db";

/// Returned when a backend name is not recognized.
#[derive(Debug, Error)]
#[error("unknown storage backend '{0}' (expected 'json' or 'sqlite')")]
pub struct UnknownBackend(pub String);

/// Which persistence backend holds the survey responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Backend::Json),
            "sqlite" => Ok(Backend::Sqlite),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Json => f.write_str("json"),
            Backend::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Construct the store for `backend` rooted at `home`. Call once per process
/// and share the returned handle.
pub fn open_store(backend: Backend, home: &Path) -> Result<Arc<dyn ResponseStore>, StoreError> {
    let store: Arc<dyn ResponseStore> = match backend {
        Backend::Json => Arc::new(JsonFileStore::open(home)?),
        Backend::Sqlite => Arc::new(SqliteStore::open(&home.join(SQLITE_FILE))?),
    };
    tracing::info!("opened {} store in {}", backend, home.display());
    Ok(store)
}
