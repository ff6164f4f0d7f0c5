// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory whole-file locking (spec.md §4.1). POSIX-only; Windows support
//! is an explicit non-goal.

use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Held lock on a `.lock` sibling file. Dropping the guard releases the
/// lock and closes the descriptor, on every exit path including panics.
pub struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

fn open_lock_file(path: &Path) -> StorageResult<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: path.display().to_string(),
            source,
        })?;
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .map_err(|source| StorageError::Lock {
            path: path.display().to_string(),
            source,
        })
}

/// Acquire an exclusive (write) lock, blocking until available.
pub fn lock_exclusive(path: &Path) -> StorageResult<LockGuard> {
    let file = open_lock_file(path)?;
    file.lock_exclusive()
        .map_err(|source| StorageError::Lock {
            path: path.display().to_string(),
            source,
        })?;
    Ok(LockGuard { file })
}

/// Acquire a shared (read) lock, blocking until available.
pub fn lock_shared(path: &Path) -> StorageResult<LockGuard> {
    let file = open_lock_file(path)?;
    file.lock_shared().map_err(|source| StorageError::Lock {
        path: path.display().to_string(),
        source,
    })?;
    Ok(LockGuard { file })
}

/// Run `f` while holding an exclusive lock on `lock_path`. The lock is
/// released on every exit path, including `f` returning an error.
pub fn with_lock<T>(
    lock_path: &Path,
    f: impl FnOnce() -> StorageResult<T>,
) -> StorageResult<T> {
    let _guard = lock_exclusive(lock_path)?;
    f()
}

/// Run `f` while holding a shared lock on `lock_path`.
pub fn with_shared_lock<T>(
    lock_path: &Path,
    f: impl FnOnce() -> StorageResult<T>,
) -> StorageResult<T> {
    let _guard = lock_shared(lock_path)?;
    f()
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
