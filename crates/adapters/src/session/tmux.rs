// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real tmux-backed multiplexer adapter.

use super::{MultiplexerAdapter, MultiplexerError};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

const TMUX_TIMEOUT: Duration = Duration::from_secs(10);

async fn run(mut cmd: Command) -> Result<std::process::Output, MultiplexerError> {
    match timeout(TMUX_TIMEOUT, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(MultiplexerError::CommandFailed(e.to_string())),
        Err(_) => Err(MultiplexerError::CommandFailed("tmux command timed out".to_string())),
    }
}

fn tmux(args: &[&str]) -> Command {
    let mut cmd = Command::new("tmux");
    cmd.args(args);
    cmd
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TmuxAdapter;

impl TmuxAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MultiplexerAdapter for TmuxAdapter {
    async fn has_session(&self, session: &str) -> Result<bool, MultiplexerError> {
        let output = run(tmux(&["has-session", "-t", session])).await?;
        Ok(output.status.success())
    }

    async fn new_session(&self, session: &str, cwd: &Path) -> Result<(), MultiplexerError> {
        let output = run(tmux(&[
            "new-session",
            "-d",
            "-s",
            session,
            "-c",
            &cwd.display().to_string(),
        ]))
        .await?;
        if !output.status.success() {
            return Err(MultiplexerError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }
        Ok(())
    }

    async fn kill_session(&self, session: &str) -> Result<(), MultiplexerError> {
        let _ = run(tmux(&["kill-session", "-t", session])).await?;
        Ok(())
    }

    async fn split_window(&self, session: &str, cwd: &Path) -> Result<String, MultiplexerError> {
        let output = run(tmux(&[
            "split-window",
            "-t",
            session,
            "-c",
            &cwd.display().to_string(),
            "-PF",
            "#{pane_id}",
        ]))
        .await?;
        if !output.status.success() {
            return Err(MultiplexerError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn send_keys(&self, pane: &str, text: &str) -> Result<(), MultiplexerError> {
        let output = run(tmux(&["send-keys", "-t", pane, text, "Enter"])).await?;
        if !output.status.success() {
            return Err(MultiplexerError::NotFound(pane.to_string()));
        }
        Ok(())
    }

    async fn capture_pane(&self, pane: &str, lines: u32) -> Result<String, MultiplexerError> {
        let range = format!("-{lines}");
        let output = run(tmux(&["capture-pane", "-t", pane, "-p", "-S", &range])).await?;
        if !output.status.success() {
            return Err(MultiplexerError::NotFound(pane.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn select_layout(&self, session: &str, layout: &str) -> Result<(), MultiplexerError> {
        let output = run(tmux(&["select-layout", "-t", session, layout])).await?;
        if !output.status.success() {
            return Err(MultiplexerError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }
        Ok(())
    }

    async fn set_pane_option(&self, pane: &str, key: &str, value: &str) -> Result<(), MultiplexerError> {
        let output = run(tmux(&["set-option", "-p", "-t", pane, key, value])).await?;
        if !output.status.success() {
            tracing::warn!(pane, key, value, "tmux set-option failed (non-fatal)");
        }
        Ok(())
    }

    async fn show_pane_option(&self, pane: &str, key: &str) -> Result<Option<String>, MultiplexerError> {
        let output = run(tmux(&["show-options", "-p", "-t", pane, "-v", key])).await?;
        if !output.status.success() {
            return Ok(None);
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    async fn kill_pane(&self, pane: &str) -> Result<(), MultiplexerError> {
        let _ = run(tmux(&["kill-pane", "-t", pane])).await?;
        Ok(())
    }

    async fn select_pane_title(&self, pane: &str, title: &str) -> Result<(), MultiplexerError> {
        let output = run(tmux(&["select-pane", "-t", pane, "-T", title])).await?;
        if !output.status.success() {
            tracing::warn!(pane, title, "tmux select-pane title failed (non-fatal)");
        }
        Ok(())
    }
}
