// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic write + validated read (spec.md §4.1).
//!
//! Writes serialize to `<path>.tmp.<random>` in the same directory,
//! `sync_all` before `rename` so a crash between write and rename never
//! exposes a partial file — `rename` is atomic on POSIX.

use crate::error::{StorageError, StorageResult};
use crate::lock::{with_lock, with_shared_lock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

fn io_err(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn schema_err(path: &Path, source: serde_json::Error) -> StorageError {
    StorageError::Schema {
        path: path.display().to_string(),
        source,
    }
}

/// Write `value` to `path` via a temp-file-then-rename. The temp name
/// includes the current process id and a counter so concurrent writers in
/// the same process never collide on the temp path.
pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| io_err(path, e))?;

    let json = serde_json::to_vec_pretty(value).map_err(|e| schema_err(path, e))?;

    let tmp_name = format!(
        ".tmp.{}.{}",
        std::process::id(),
        next_temp_suffix(),
    );
    let tmp_path = parent.join(tmp_name);

    {
        use std::io::Write;
        let mut file = std::fs::File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
        file.write_all(&json).map_err(|e| io_err(&tmp_path, e))?;
        file.sync_all().map_err(|e| io_err(&tmp_path, e))?;
    }

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        io_err(path, e)
    })?;

    Ok(())
}

fn next_temp_suffix() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Read and deserialize `path`. A missing file is `NotFound`-shaped at the
/// caller's discretion (this layer surfaces the raw io error); malformed
/// JSON is a `Schema` error, surfaced by callers as `CoordError::Corrupted`.
pub fn read_validated<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| schema_err(path, e))
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Exclusive-lock, read, apply a pure mutator, write atomically. The
/// mutator returns both the new value and an arbitrary result to hand back
/// to the caller (e.g. the updated entity, or emitted events).
pub fn locked_update<T, R>(
    lock_path: &Path,
    file_path: &Path,
    mutator: impl FnOnce(T) -> StorageResult<(T, R)>,
) -> StorageResult<R>
where
    T: Serialize + DeserializeOwned,
{
    with_lock(lock_path, || {
        let current: T = read_validated(file_path)?;
        let (updated, result) = mutator(current)?;
        write_atomic(file_path, &updated)?;
        Ok(result)
    })
}

/// Same as [`locked_update`] but supplies `default` if the file does not
/// yet exist, so the first write to a not-yet-created entity still goes
/// through the same exclusive-lock path.
pub fn locked_upsert<T, R>(
    lock_path: &Path,
    file_path: &Path,
    default: impl FnOnce() -> T,
    mutator: impl FnOnce(T) -> StorageResult<(T, R)>,
) -> StorageResult<R>
where
    T: Serialize + DeserializeOwned,
{
    with_lock(lock_path, || {
        let current: T = if file_path.exists() {
            read_validated(file_path)?
        } else {
            default()
        };
        let (updated, result) = mutator(current)?;
        write_atomic(file_path, &updated)?;
        Ok(result)
    })
}

/// Read under a shared lock, for callers that want read/write linearized
/// against concurrent exclusive writers without holding an exclusive lock
/// themselves.
pub fn locked_read<T: DeserializeOwned>(lock_path: &Path, file_path: &Path) -> StorageResult<T> {
    with_shared_lock(lock_path, || read_validated(file_path))
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
