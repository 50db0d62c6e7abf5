//! Crash-safe single-file persistence of the cache record.

use marine_core::error::CacheError;
use marine_core::types::{CacheRecord, SCHEMA_VERSION};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

fn persistence(path: &Path, reason: impl ToString) -> CacheError {
    CacheError::Persistence {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `.{name}.tmp.` prefix shared by every temporary file of `path`.
fn temp_prefix(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("cache");
    format!(".{}.tmp.", name)
}

fn temp_path(path: &Path, parent: &Path) -> PathBuf {
    parent.join(format!(
        "{}{}.{}",
        temp_prefix(path),
        std::process::id(),
        TMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ))
}

/// Delete temporary files left next to `path` by interrupted writes.
///
/// Files written by the current process are kept. Returns how many were
/// removed.
pub fn remove_stale_temps(path: &Path) -> usize {
    let prefix = temp_prefix(path);
    let own = format!("{}{}.", prefix, std::process::id());
    let entries = match std::fs::read_dir(parent_dir(path)) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let mut removed = 0;
    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(&prefix) || name.starts_with(&own) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => warn!(file = name, error = %e, "Failed to remove stale temporary file"),
        }
    }
    removed
}

/// Write `record` to `path` atomically.
///
/// The record goes to a temporary file in the same directory, is synced,
/// and is then renamed over the target. A crash at any point leaves either
/// the previous record or the new one on disk, never a mix.
pub async fn write_record(path: &Path, record: &CacheRecord) -> Result<(), CacheError> {
    let bytes =
        serde_json::to_vec(record).map_err(|e| CacheError::Serialization(e.to_string()))?;

    let parent = parent_dir(path);
    tokio::fs::create_dir_all(&parent)
        .await
        .map_err(|e| persistence(path, e))?;

    let tmp = temp_path(path, &parent);
    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(persistence(path, e));
    }

    // Make the rename itself durable.
    if let Ok(dir) = tokio::fs::File::open(&parent).await {
        let _ = dir.sync_all().await;
    }

    debug!(path = %path.display(), bytes = bytes.len(), "Cache record persisted");
    Ok(())
}

/// Read the record at `path`.
///
/// Returns `Ok(None)` when no record exists.
pub fn read_record(path: &Path) -> Result<Option<CacheRecord>, CacheError> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CacheError::Io(e)),
    };

    let record: CacheRecord =
        serde_json::from_slice(&raw).map_err(|e| CacheError::Serialization(e.to_string()))?;

    if record.schema_version != SCHEMA_VERSION {
        return Err(CacheError::SchemaMismatch {
            found: record.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    Ok(Some(record))
}
