// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal multiplexer adapter (spec.md §6 subprocess contracts: tmux-like
//! commands). Treated as an external collaborator — spec.md §1 puts the
//! multiplexer itself out of scope; this module is the thin command-line
//! surface the agent lifecycle drives it through.

mod noop;
mod tmux;

pub use noop::NoOpMultiplexer;
pub use tmux::TmuxAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMultiplexer, MuxCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MultiplexerError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Adapter over a tmux-like terminal multiplexer (spec.md §6 subprocess
/// contracts). One session hosts one team; each agent gets its own pane
/// split from that session.
#[async_trait]
pub trait MultiplexerAdapter: Send + Sync + 'static {
    /// `has-session -t <name>`.
    async fn has_session(&self, session: &str) -> Result<bool, MultiplexerError>;

    /// `new-session -d -s <name>`.
    async fn new_session(&self, session: &str, cwd: &Path) -> Result<(), MultiplexerError>;

    /// `kill-session -t <name>`.
    async fn kill_session(&self, session: &str) -> Result<(), MultiplexerError>;

    /// `split-window -t <session> -c <cwd> -PF '#{pane_id}'`. Returns the
    /// new pane id captured from stdout.
    async fn split_window(&self, session: &str, cwd: &Path) -> Result<String, MultiplexerError>;

    /// `send-keys -t <pane> <text> Enter`.
    async fn send_keys(&self, pane: &str, text: &str) -> Result<(), MultiplexerError>;

    /// `capture-pane -t <pane> -p -S -<lines>`.
    async fn capture_pane(&self, pane: &str, lines: u32) -> Result<String, MultiplexerError>;

    /// `select-layout -t <session> <layout>`.
    async fn select_layout(&self, session: &str, layout: &str) -> Result<(), MultiplexerError>;

    /// `set-option -p -t <pane> <key> <value>`.
    async fn set_pane_option(&self, pane: &str, key: &str, value: &str) -> Result<(), MultiplexerError>;

    /// `show-options -p -t <pane> -v <key>`.
    async fn show_pane_option(&self, pane: &str, key: &str) -> Result<Option<String>, MultiplexerError>;

    /// `kill-pane -t <pane>`.
    async fn kill_pane(&self, pane: &str) -> Result<(), MultiplexerError>;

    /// `select-pane -t <pane> -T <title>`.
    async fn select_pane_title(&self, pane: &str, title: &str) -> Result<(), MultiplexerError>;
}
