// ABOUTME: Persistence layer for csatd, holding survey responses durably.
// ABOUTME: Provides the ResponseStore contract, the JSON-file store, a SQLite adapter, and backend selection.

pub mod backend;
pub mod json_file;
pub mod manager;
pub mod sqlite;

pub use backend::{ResponseStore, StoreError};
pub use json_file::{BACKUP_FILE, DATA_FILE, JsonFileStore};
pub use manager::{Backend, UnknownBackend, open_store};
pub use sqlite::SqliteStore;
