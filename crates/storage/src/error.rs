// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-layer errors, translated to `octeam_core::CoordError` at the
//! boundary callers actually see.

use octeam_core::CoordError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("schema violation at {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to acquire lock at {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<StorageError> for CoordError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io { path, source } => {
                CoordError::unavailable(format!("{path}: {source}"))
            }
            StorageError::Schema { path, source } => {
                CoordError::corrupted(format!("{path}: {source}"))
            }
            StorageError::Lock { path, source } => {
                CoordError::unavailable(format!("lock {path}: {source}"))
            }
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
