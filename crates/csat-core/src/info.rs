// ABOUTME: Storage metadata reported by every backend: locations, record count, file state.
// ABOUTME: Serialized as-is by the storage-info and health endpoints.

use serde::{Deserialize, Serialize};

/// Description of where and how responses are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub storage_type: String,
    pub storage_location: String,
    /// Absent for backends without a backup file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_location: Option<String>,
    pub total_records: usize,
    pub file_exists: bool,
    pub backup_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Last modification of the primary file, ISO-8601 UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}
