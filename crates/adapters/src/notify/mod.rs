// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notification adapter (spec.md §4.6: agent idle/blocked/shutdown
//! events surfaced to the operator outside the terminal).

mod desktop;
mod noop;

pub use desktop::DesktopNotifyAdapter;
pub use noop::NoOpNotifyAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Adapter for sending a desktop notification with a title and body. Not
/// `: Clone` so callers can hold it as `Arc<dyn NotifyAdapter>` (concrete
/// implementations are independently `Clone` where that's convenient).
#[async_trait]
pub trait NotifyAdapter: Send + Sync + 'static {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}
