// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! octeam-daemon: the event bus, dispatch engine, agent lifecycle
//! orchestration, heartbeat/stale-sweep monitor, and workflow monitor
//! (spec.md §4.4, §4.5) — bundled behind the `Coordinator` facade that
//! replaces the original's global-process-state design (spec.md §9).
//!
//! Every other module here (`agents`, `dispatch`, `server`, `sweep`,
//! `sse`, `workflow`) is a free function taking its dependencies
//! explicitly; `Coordinator` is the one place that owns them as a handle.

pub mod agents;
pub mod coordinator;
pub mod dispatch;
pub mod event_bus;
pub mod server;
pub mod sse;
pub mod sweep;
pub mod workflow;

pub use agents::SpawnAgentParams;
pub use coordinator::{Coordinator, CoordinatorConfig};
pub use event_bus::EventBus;
