// ABOUTME: JSON-file response store with backup-before-write rotation and crash-safe load.
// ABOUTME: Keeps all records in memory behind one mutex and rewrites the primary file on every add.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use csat_core::record::{TIMESTAMP_FORMAT, next_id, now_timestamp};
use csat_core::{NewResponse, Record, Stats, StorageInfo, export_csv, most_recent_first};
use thiserror::Error;

use crate::backend::{ResponseStore, StoreError};

/// Primary data file name inside the storage directory.
pub const DATA_FILE: &str = "csat_data.json";

/// Backup file name; always the primary as it was before the latest write.
pub const BACKUP_FILE: &str = "csat_backup.json";

const STORAGE_TYPE: &str = "JSON File Storage";

/// Reasons a data file could not be loaded. Never surfaced to callers.
#[derive(Debug, Error)]
enum LoadCorruption {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Response store backed by a pretty-printed JSON array on disk.
///
/// Only one instance may own a storage directory at a time; there is no
/// coordination between processes.
pub struct JsonFileStore {
    dir: PathBuf,
    data_path: PathBuf,
    backup_path: PathBuf,
    records: Mutex<Vec<Record>>,
}

impl JsonFileStore {
    /// Open the store rooted at `dir`, creating the directory if needed.
    ///
    /// Loads the primary file, falling back to the backup when the primary is
    /// missing or unreadable, and to an empty set when both are. Only a
    /// directory that cannot be created is an error.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let unavailable = |source| StoreError::StorageUnavailable {
            path: dir.to_path_buf(),
            source,
        };

        fs::create_dir_all(dir).map_err(unavailable)?;
        let dir = std::path::absolute(dir).map_err(unavailable)?;

        let data_path = dir.join(DATA_FILE);
        let backup_path = dir.join(BACKUP_FILE);
        let records = load_records(&data_path, &backup_path);

        Ok(Self {
            dir,
            data_path,
            backup_path,
            records: Mutex::new(records),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        // A panic while holding the lock cannot leave the Vec half-updated.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the full record set: back up the current primary, then replace
    /// the primary atomically (temp file, fsync, rename).
    fn persist(&self, records: &[Record]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::StorageUnavailable {
            path: self.dir.clone(),
            source,
        })?;

        if self.data_path.exists() {
            fs::copy(&self.data_path, &self.backup_path).map_err(|source| {
                StoreError::PersistenceFailure {
                    path: self.backup_path.clone(),
                    source,
                }
            })?;
        }

        write_atomic(&self.data_path, records).map_err(|source| StoreError::PersistenceFailure {
            path: self.data_path.clone(),
            source,
        })?;

        tracing::info!("saved {} records to {}", records.len(), self.data_path.display());
        Ok(())
    }
}

impl ResponseStore for JsonFileStore {
    /// If the write fails the record stays in memory and the error is
    /// returned; the next successful write flushes it along with the new one.
    fn add(&self, response: NewResponse) -> Result<u64, StoreError> {
        let mut records = self.lock();

        let id = next_id(records.iter());
        records.push(response.into_record(id, now_timestamp()));
        self.persist(&records)?;

        tracing::debug!("added response {}", id);
        Ok(id)
    }

    fn list(&self) -> Result<Vec<Record>, StoreError> {
        Ok(most_recent_first(&self.lock()))
    }

    fn stats(&self) -> Result<Stats, StoreError> {
        Ok(Stats::compute(&self.lock()))
    }

    fn export_csv(&self) -> Result<String, StoreError> {
        Ok(export_csv(&self.lock()))
    }

    fn info(&self) -> Result<StorageInfo, StoreError> {
        let records = self.lock();

        let file_exists = self.data_path.exists();
        let (file_size, last_modified) = if file_exists {
            let meta = fs::metadata(&self.data_path).map_err(|source| {
                StoreError::StorageUnavailable {
                    path: self.data_path.clone(),
                    source,
                }
            })?;
            let modified = meta
                .modified()
                .ok()
                .map(|t| DateTime::<Utc>::from(t).format(TIMESTAMP_FORMAT).to_string());
            (Some(meta.len()), modified)
        } else {
            (None, None)
        };

        Ok(StorageInfo {
            storage_type: STORAGE_TYPE.to_string(),
            storage_location: self.data_path.display().to_string(),
            backup_location: Some(self.backup_path.display().to_string()),
            total_records: records.len(),
            file_exists,
            backup_exists: self.backup_path.exists(),
            file_size,
            last_modified,
        })
    }
}

/// Load the primary file, then the backup, then give up and start empty.
fn load_records(data_path: &Path, backup_path: &Path) -> Vec<Record> {
    for path in [data_path, backup_path] {
        if !path.exists() {
            continue;
        }
        match read_records(path) {
            Ok(records) => {
                tracing::info!("loaded {} records from {}", records.len(), path.display());
                return records;
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable data file {}: {}", path.display(), e);
            }
        }
    }

    tracing::info!("no usable data file, starting with an empty record set");
    Vec::new()
}

fn read_records(path: &Path) -> Result<Vec<Record>, LoadCorruption> {
    let contents = fs::read_to_string(path)?;
    let records: Vec<Record> = serde_json::from_str(&contents)?;
    Ok(records)
}

fn write_atomic(path: &Path, records: &[Record]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(records).map_err(io::Error::from)?;

    let tmp_path = path.with_extension("json.tmp");
    let mut file = File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;

    // Best-effort: the rename already happened, so the data is consistent.
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn open_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("deep").join("persistent_data");

        let store = JsonFileStore::open(&home).unwrap();

        assert!(home.is_dir());
        assert!(store.data_path().is_absolute());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn open_fails_when_directory_cannot_be_created() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let result = JsonFileStore::open(blocker.join("data"));

        assert!(matches!(result, Err(StoreError::StorageUnavailable { .. })));
    }

    #[test]
    fn add_assigns_sequential_ids() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        let assigned: Vec<u64> = (0..5)
            .map(|i| store.add(NewResponse::new(i % 5 + 1)).unwrap())
            .collect();

        assert_eq!(assigned, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn concrete_scenario() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        let first = store
            .add(NewResponse::new(5).with_context("Compra").with_comment("Great"))
            .unwrap();
        let second = store
            .add(NewResponse::new(3).with_context("Devolução").with_comment(""))
            .unwrap();
        assert_eq!((first, second), (1, 2));

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.average, 4.0);
        assert_eq!(stats.high_satisfaction, 1);
        let dist: Vec<usize> = stats.distribution.values().copied().collect();
        assert_eq!(dist, vec![0, 0, 1, 0, 1]);

        assert_eq!(ids(&store.list().unwrap()), vec![2, 1]);
    }

    #[test]
    fn reopen_restores_written_records() {
        let dir = TempDir::new().unwrap();
        let before = {
            let store = JsonFileStore::open(dir.path()).unwrap();
            store
                .add(NewResponse::new(4).with_context("Suporte/Assistência"))
                .unwrap();
            store.add(NewResponse::new(2).with_comment("demorou")).unwrap();
            store.list().unwrap()
        };

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.list().unwrap(), before);
    }

    #[test]
    fn backup_holds_previous_state() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        store.add(NewResponse::new(5)).unwrap();
        assert!(!store.backup_path().exists(), "first write has nothing to back up");

        store.add(NewResponse::new(1)).unwrap();
        let backup: Vec<Record> =
            serde_json::from_str(&fs::read_to_string(store.backup_path()).unwrap()).unwrap();
        let primary: Vec<Record> =
            serde_json::from_str(&fs::read_to_string(store.data_path()).unwrap()).unwrap();

        assert_eq!(ids(&backup), vec![1]);
        assert_eq!(ids(&primary), vec![1, 2]);
    }

    #[test]
    fn loads_backup_when_primary_deleted() {
        let dir = TempDir::new().unwrap();
        {
            let store = JsonFileStore::open(dir.path()).unwrap();
            store.add(NewResponse::new(5)).unwrap();
            store.add(NewResponse::new(4)).unwrap();
        }
        fs::remove_file(dir.path().join(DATA_FILE)).unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(ids(&store.list().unwrap()), vec![1]);
    }

    #[test]
    fn loads_backup_when_primary_corrupt() {
        let dir = TempDir::new().unwrap();
        {
            let store = JsonFileStore::open(dir.path()).unwrap();
            store.add(NewResponse::new(5)).unwrap();
            store.add(NewResponse::new(4)).unwrap();
        }
        fs::write(dir.path().join(DATA_FILE), "[{\"id\": 1, \"rat").unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.stats().unwrap().total, 1);
    }

    #[test]
    fn starts_empty_when_both_files_unusable() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DATA_FILE), "{\"not\": \"an array\"}").unwrap();
        fs::write(dir.path().join(BACKUP_FILE), "garbage").unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();

        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.add(NewResponse::new(3)).unwrap(), 1);
    }

    #[test]
    fn ids_continue_past_largest_loaded_id() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(DATA_FILE),
            r#"[
              {"id": 3, "rating": 5, "context": "", "comment": "", "timestamp": "2025-01-01T00:00:00"},
              {"id": 7, "rating": 1, "context": "", "comment": "", "timestamp": "2025-01-02T00:00:00"}
            ]"#,
        )
        .unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.add(NewResponse::new(4)).unwrap(), 8);
    }

    #[test]
    fn stats_survive_extreme_ratings_through_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        store.add(NewResponse::new(i64::MAX)).unwrap();
        store.add(NewResponse::new(1)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert!(stats.average.is_finite());
    }

    #[test]
    fn add_stamps_current_time_after_malformed_legacy_timestamp() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(DATA_FILE),
            r#"[{"id": 1, "rating": 5, "context": "", "comment": "", "timestamp": "not-a-date"},
                {"id": 2, "rating": 3, "context": "", "comment": "", "timestamp": "2999-01-01T00:00:00"}]"#,
        )
        .unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        store.add(NewResponse::new(4)).unwrap();
        store.add(NewResponse::new(2)).unwrap();

        let records = store.list().unwrap();
        let new: Vec<&Record> = records.iter().filter(|r| r.id >= 3).collect();
        assert_eq!(new.len(), 2);
        for record in new {
            assert!(
                chrono::NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT).is_ok(),
                "record {} got timestamp {}",
                record.id,
                record.timestamp
            );
            assert!(record.timestamp.as_str() < "2999-01-01T00:00:00");
        }
    }

    #[test]
    fn primary_file_is_indented_and_keeps_unicode() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        store
            .add(NewResponse::new(3).with_context("Devolução").with_comment("ótimo"))
            .unwrap();

        let raw = fs::read_to_string(store.data_path()).unwrap();
        assert!(raw.contains("Devolução"));
        assert!(raw.contains("ótimo"));
        assert!(raw.contains("\n  {"), "expected two-space indentation: {}", raw);
    }

    #[test]
    fn stats_total_matches_list_len() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        for rating in [1, 2, 5, 5, 4] {
            store.add(NewResponse::new(rating)).unwrap();
        }

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, store.list().unwrap().len());
        assert_eq!(stats.distribution.values().sum::<usize>(), stats.total);
    }

    #[test]
    fn export_rows_follow_list_order() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        for rating in [5, 3, 4] {
            store.add(NewResponse::new(rating).with_context("Compra")).unwrap();
        }

        let csv = store.export_csv().unwrap();
        let row_ids: Vec<u64> = csv
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap().parse().unwrap())
            .collect();

        assert_eq!(row_ids, ids(&store.list().unwrap()));
    }

    #[test]
    fn concurrent_adds_get_unique_ids() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        let mut assigned: Vec<u64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..5)
                            .map(|_| store.add(NewResponse::new(4)).unwrap())
                            .collect::<Vec<u64>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assigned.sort_unstable();
        assert_eq!(assigned, (1..=40).collect::<Vec<u64>>());

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.stats().unwrap().total, 40);
    }

    #[test]
    fn info_reports_file_state() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        let empty = store.info().unwrap();
        assert_eq!(empty.storage_type, "JSON File Storage");
        assert_eq!(empty.total_records, 0);
        assert!(!empty.file_exists);
        assert!(!empty.backup_exists);
        assert!(empty.file_size.is_none());

        store.add(NewResponse::new(5)).unwrap();
        store.add(NewResponse::new(5)).unwrap();

        let info = store.info().unwrap();
        assert_eq!(info.total_records, 2);
        assert!(info.file_exists);
        assert!(info.backup_exists);
        assert!(info.file_size.unwrap() > 0);
        assert!(info.last_modified.is_some());
        assert!(info.storage_location.ends_with(DATA_FILE));
    }

    #[test]
    fn failed_write_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        // A directory squatting on the temp file path makes the write fail.
        fs::create_dir_all(store.data_path().with_extension("json.tmp")).unwrap();

        let result = store.add(NewResponse::new(5));

        assert!(matches!(result, Err(StoreError::PersistenceFailure { .. })));
        assert!(!store.data_path().exists());
    }
}
