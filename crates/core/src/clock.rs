// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so the task engine, heartbeat monitor, and dispatch log
//! can be driven by a deterministic fake in tests instead of the wall clock.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time, expressed as milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Current time as epoch milliseconds.
    fn epoch_ms(&self) -> u64;

    /// Current time as an ISO 8601 (RFC 3339) string, the wire format used
    /// for every persisted timestamp field in this system.
    fn now_iso8601(&self) -> String {
        iso8601_from_epoch_ms(self.epoch_ms())
    }
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Deterministic clock for tests. Starts at a fixed instant and only moves
/// forward when explicitly advanced.
#[derive(Debug, Clone)]
pub struct FakeClock {
    epoch_ms: Arc<AtomicU64>,
}

impl FakeClock {
    pub fn new(start_epoch_ms: u64) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicU64::new(start_epoch_ms)),
        }
    }

    /// Advance the clock by `delta_ms` milliseconds and return the new value.
    pub fn advance(&self, delta_ms: u64) -> u64 {
        self.epoch_ms.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }

    /// Jump the clock to an absolute epoch_ms value.
    pub fn set(&self, epoch_ms: u64) {
        self.epoch_ms.store(epoch_ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        // 2024-01-01T00:00:00Z
        Self::new(1_704_067_200_000)
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }
}

/// Format epoch milliseconds as an ISO 8601 / RFC 3339 UTC string.
pub fn iso8601_from_epoch_ms(epoch_ms: u64) -> String {
    let dt: DateTime<Utc> = DateTime::from_timestamp_millis(epoch_ms as i64).unwrap_or_else(Utc::now);
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO 8601 / RFC 3339 timestamp back into epoch milliseconds.
/// Used by the stale-agent sweep to measure heartbeat age; returns `None`
/// for a malformed string rather than panicking.
pub fn epoch_ms_from_iso8601(s: &str) -> Option<u64> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.timestamp_millis().max(0) as u64)
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
