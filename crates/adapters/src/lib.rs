// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! octeam-adapters: the external collaborators spec.md §1 declares out of
//! scope, behind small async traits — a terminal multiplexer adapter
//! (tmux), an AI-agent-runtime adapter (subprocess controller + SDK client
//! + SSE consumer), and a desktop notification adapter. Each ships a real
//! implementation plus a fake/no-op for tests, mirroring the teacher's
//! `oj-adapters` crate shape.

pub mod notify;
pub mod pane_watcher;
pub mod runtime;
pub mod session;

pub use notify::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use pane_watcher::{AgentError, AgentState, PaneWatcher};
pub use runtime::{
    RuntimeError, SdkClient, SdkEvent, ServerController, HttpRuntime,
};
pub use session::{MultiplexerAdapter, MultiplexerError, NoOpMultiplexer, TmuxAdapter};

#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use runtime::{FakeRuntime, RuntimeCall};
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeMultiplexer, MuxCall};
