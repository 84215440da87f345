//! Durable persistence of the tracker state.
//!
//! The full state (registry + pending confirmations) is serialized to a
//! single JSON file. Every save rewrites the whole file: the snapshot is
//! written to a sibling temp file first and renamed into place, so a crash
//! mid-write never leaves a truncated snapshot behind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::{PendingConfirmation, Subscription};

/// The complete durable state of the tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub registry: Vec<Subscription>,
    #[serde(default)]
    pub pending: HashMap<String, PendingConfirmation>,
}

/// Reads and writes [`Snapshot`]s at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, creating and persisting an empty one if the file
    /// does not exist yet.
    pub fn load_or_init(&self) -> Result<Snapshot, StoreError> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "snapshot file not found, creating an empty one");
            let snapshot = Snapshot::default();
            self.save(&snapshot)?;
            return Ok(snapshot);
        }
        self.load()
    }

    /// Load the snapshot from disk.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let data = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrite the snapshot file with the given state.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot).map_err(StoreError::Encode)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LastResult;
    use chrono::Utc;

    fn sample_snapshot() -> Snapshot {
        let mut sub = Subscription::new("a@x.com", "K1", "S1");
        sub.last_result = LastResult::Balance(r#"{"ZEUR":"10"}"#.to_string());

        let mut pending = HashMap::new();
        pending.insert(
            "token-1".to_string(),
            PendingConfirmation::remove("b@y.com", None, Utc::now()),
        );

        Snapshot {
            registry: vec![sub],
            pending,
        }
    }

    #[test]
    fn test_load_or_init_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("saldo.json"));

        let snapshot = store.load_or_init().unwrap();
        assert_eq!(snapshot, Snapshot::default());
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("saldo.json"));

        let snapshot = sample_snapshot();
        store.save(&snapshot).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/state/saldo.json"));

        store.save(&Snapshot::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("saldo.json"));

        store.save(&sample_snapshot()).unwrap();
        store.save(&Snapshot::default()).unwrap();

        assert_eq!(store.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn test_load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saldo.json");
        fs::write(&path, "not json").unwrap();

        let err = SnapshotStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("saldo.json"));
        store.save(&sample_snapshot()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
