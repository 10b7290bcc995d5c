//! Durable holder of the latest published snapshot
//!
//! The store keeps the current snapshot in memory behind a `RwLock` and
//! mirrors it to two artifacts on disk: the snapshot JSON and a plain
//! last-update timestamp string. Files are written to a temporary path and
//! renamed, so a reader process never observes a half-written snapshot.
//!
//! Load failures (missing, corrupt, or unreadable state) are absorbed as an
//! empty store; write failures are surfaced to the publisher, which logs
//! them while the in-memory snapshot stays authoritative. The next
//! successful publish retries durability.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::Snapshot;

/// Snapshot JSON artifact name
const SNAPSHOT_FILE: &str = "snapshot.json";

/// Plain-text last-update timestamp artifact name
const LAST_UPDATE_FILE: &str = "last_update.txt";

/// Errors that can occur while persisting or recovering snapshots
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Thread-safe, optionally file-backed snapshot store
pub struct SnapshotStore {
    /// Latest published snapshot
    current: RwLock<Option<Snapshot>>,

    /// Data directory for the durable artifacts; `None` keeps the store
    /// memory-only (tests, one-shot sweeps to stdout)
    data_dir: Option<PathBuf>,
}

impl SnapshotStore {
    /// Create a memory-only store
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(None),
            data_dir: None,
        }
    }

    /// Create a store persisting under the given data directory
    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            current: RwLock::new(None),
            data_dir: Some(data_dir.into()),
        }
    }

    /// Path of the snapshot artifact, if the store is file-backed
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|d| d.join(SNAPSHOT_FILE))
    }

    /// Path of the last-update artifact, if the store is file-backed
    pub fn last_update_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|d| d.join(LAST_UPDATE_FILE))
    }

    /// Latest published snapshot
    ///
    /// Empty only before the very first publish of a cold-started process.
    pub async fn read(&self) -> Option<Snapshot> {
        self.current.read().await.clone()
    }

    /// Atomically replace the stored snapshot and persist it
    ///
    /// The in-memory snapshot is replaced first and stays the caller-visible
    /// truth even when persistence fails for this cycle.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the durable artifacts cannot be written
    pub async fn publish(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        *self.current.write().await = Some(snapshot.clone());

        if let Some(dir) = &self.data_dir {
            persist(dir, &snapshot).await?;
            tracing::debug!(path = %dir.join(SNAPSHOT_FILE).display(), "snapshot persisted");
        }

        Ok(())
    }

    /// Recover the last persisted snapshot into memory
    ///
    /// Returns `true` when a snapshot was recovered. Missing or corrupt
    /// state is treated as an empty store, never as an error.
    pub async fn load(&self) -> bool {
        let Some(path) = self.snapshot_path() else {
            return false;
        };

        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return false,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "snapshot unreadable, starting cold");
                return false;
            }
        };

        match Snapshot::from_json(&json) {
            Ok(snapshot) => {
                tracing::info!(
                    path = %path.display(),
                    facilities = snapshot.len(),
                    age_seconds = snapshot.age_seconds(),
                    "snapshot recovered"
                );
                *self.current.write().await = Some(snapshot);
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "snapshot corrupt, starting cold");
                false
            }
        }
    }

    /// Current store status, for the CLI
    pub async fn status(&self) -> StoreStatus {
        let current = self.current.read().await;
        StoreStatus {
            has_snapshot: current.is_some(),
            age_seconds: current.as_ref().map(Snapshot::age_seconds),
            snapshot_path: self.snapshot_path(),
        }
    }
}

/// Write both durable artifacts via temp-file-then-rename
async fn persist(dir: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    tokio::fs::create_dir_all(dir).await?;

    let json = snapshot.to_json()?;
    write_atomic(&dir.join(SNAPSHOT_FILE), json.as_bytes()).await?;

    let stamp = snapshot.taken_at.to_rfc3339();
    write_atomic(&dir.join(LAST_UPDATE_FILE), stamp.as_bytes()).await?;

    Ok(())
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Store status information
#[derive(Debug, Clone)]
pub struct StoreStatus {
    pub has_snapshot: bool,
    pub age_seconds: Option<i64>,
    pub snapshot_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FacilityState, FacilityStatus};
    use chrono::Utc;

    fn sample_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::begin();
        snapshot.push(FacilityStatus {
            facility: "Rotonde".to_string(),
            available: 431,
            state: FacilityState::Open,
            display: "431 / 1800".to_string(),
            observed_at: Utc::now(),
        });
        snapshot
    }

    #[tokio::test]
    async fn test_memory_store_publish_read() {
        let store = SnapshotStore::in_memory();
        assert!(store.read().await.is_none());

        store.publish(sample_snapshot()).await.unwrap();

        let read = store.read().await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read.get("Rotonde").unwrap().available, 431);
    }

    #[tokio::test]
    async fn test_persist_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::with_dir(dir.path());

        let snapshot = sample_snapshot();
        store.publish(snapshot.clone()).await.unwrap();

        assert!(store.snapshot_path().unwrap().exists());
        let stamp = std::fs::read_to_string(store.last_update_path().unwrap()).unwrap();
        assert_eq!(stamp, snapshot.taken_at.to_rfc3339());
    }

    #[tokio::test]
    async fn test_load_recovers_persisted_snapshot() {
        let dir = tempfile::tempdir().unwrap();

        let writer = SnapshotStore::with_dir(dir.path());
        writer.publish(sample_snapshot()).await.unwrap();

        let reader = SnapshotStore::with_dir(dir.path());
        assert!(reader.load().await);
        assert_eq!(reader.read().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::with_dir(dir.path().join("never-written"));
        assert!(!store.load().await);
        assert!(store.read().await.is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::with_dir(dir.path());
        std::fs::write(store.snapshot_path().unwrap(), "{not json").unwrap();

        assert!(!store.load().await);
        assert!(store.read().await.is_none());
    }

    #[tokio::test]
    async fn test_publish_replaces_whole_snapshot() {
        let store = SnapshotStore::in_memory();
        store.publish(sample_snapshot()).await.unwrap();

        let mut second = Snapshot::begin();
        second.push(FacilityStatus::fetch_error("Mignet"));
        store.publish(second).await.unwrap();

        let read = store.read().await.unwrap();
        assert_eq!(read.len(), 1);
        assert!(read.get("Rotonde").is_none());
        assert!(read.get("Mignet").is_some());
    }

    #[tokio::test]
    async fn test_status_reporting() {
        let store = SnapshotStore::in_memory();
        let before = store.status().await;
        assert!(!before.has_snapshot);
        assert!(before.age_seconds.is_none());

        store.publish(sample_snapshot()).await.unwrap();
        let after = store.status().await;
        assert!(after.has_snapshot);
        assert!(after.age_seconds.unwrap() < 5);
    }
}
