//! The cache store.

use arc_swap::ArcSwapOption;
use marine_core::error::CacheError;
use marine_core::types::{CacheRecord, Snapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::persist::{read_record, remove_stale_temps, write_record};

/// A snapshot together with its age at read time.
#[derive(Debug, Clone)]
pub struct CacheView {
    pub snapshot: Arc<Snapshot>,
    pub age_seconds: i64,
}

/// Holds the live snapshot and mirrors it to disk.
///
/// Readers load an `Arc` to the current snapshot without locking; a commit
/// replaces the reference in one step, so a reader sees either the old or
/// the new snapshot in full.
pub struct CacheStore {
    current: ArcSwapOption<Snapshot>,
    path: PathBuf,
    commit_lock: Mutex<()>,
}

impl CacheStore {
    /// Create an empty store backed by the record at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            path: path.into(),
            commit_lock: Mutex::new(()),
        }
    }

    /// Path of the persisted record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current snapshot, or `None` before the first commit or load.
    pub fn read(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Current snapshot with its age at `now`.
    pub fn view(&self, now: i64) -> Result<CacheView, CacheError> {
        let snapshot = self.read().ok_or(CacheError::ColdStart)?;
        let age_seconds = snapshot.age_at(now);
        Ok(CacheView {
            snapshot,
            age_seconds,
        })
    }

    pub fn has_data(&self) -> bool {
        self.current.load().is_some()
    }

    /// Replace the live snapshot, then persist it.
    ///
    /// The in-memory swap always happens. A persistence failure is returned
    /// but does not roll the swap back.
    pub async fn commit(&self, snapshot: Snapshot) -> Result<(), CacheError> {
        // Serializes commits so the disk never ends up behind memory.
        let _guard = self.commit_lock.lock().await;

        let snapshot = Arc::new(snapshot);
        self.current.store(Some(Arc::clone(&snapshot)));

        let record = CacheRecord::new(snapshot.as_ref().clone());
        if let Err(e) = write_record(&self.path, &record).await {
            error!(
                path = %self.path.display(),
                error = %e,
                "Failed to persist snapshot, serving from memory only"
            );
            return Err(e);
        }
        Ok(())
    }

    /// Read the persisted record, if present and valid.
    ///
    /// Never fatal: a missing, unreadable, corrupt or outdated record is
    /// reported as `None`.
    pub fn load_from_disk(&self) -> Option<Snapshot> {
        match read_record(&self.path) {
            Ok(Some(record)) => match record.snapshot.validate() {
                Ok(()) => Some(record.snapshot),
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Ignoring invalid cached snapshot"
                    );
                    None
                }
            },
            Ok(None) => {
                info!(path = %self.path.display(), "No cache record found");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to load cache record");
                None
            }
        }
    }

    /// Install a snapshot in memory without persisting it.
    ///
    /// Used at startup to serve the record just loaded from disk.
    pub fn seed(&self, snapshot: Snapshot) {
        self.current.store(Some(Arc::new(snapshot)));
    }

    /// Clear temporary files a crashed writer left beside the record.
    ///
    /// Only the process that owns the record should call this, before its
    /// first commit.
    pub fn remove_stale_temps(&self) -> usize {
        let removed = remove_stale_temps(&self.path);
        if removed > 0 {
            info!(path = %self.path.display(), removed, "Removed stale temporary files");
        }
        removed
    }
}
