// ABOUTME: The storage contract every csatd backend implements, and its error type.
// ABOUTME: Handlers depend only on this trait, so backends are swappable at startup.

use std::io;
use std::path::PathBuf;

use csat_core::{NewResponse, Record, Stats, StorageInfo};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage directory or a file in it cannot be created or accessed.
    #[error("storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serializing, backing up, or writing the record set failed.
    #[error("failed to persist {}: {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Durable, append-only collection of survey responses.
///
/// Every operation is atomic with respect to every other operation on the
/// same store. `add` returns only after the new record is durable.
pub trait ResponseStore: Send + Sync {
    /// Append a response and return its newly assigned id.
    fn add(&self, response: NewResponse) -> Result<u64, StoreError>;

    /// All records, most recent first.
    fn list(&self) -> Result<Vec<Record>, StoreError>;

    fn stats(&self) -> Result<Stats, StoreError>;

    /// CSV document of all records in `list` order.
    fn export_csv(&self) -> Result<String, StoreError>;

    fn info(&self) -> Result<StorageInfo, StoreError>;
}
