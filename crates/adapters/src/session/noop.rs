// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op multiplexer adapter, used when agent spawning is disabled.

use super::{MultiplexerAdapter, MultiplexerError};
use async_trait::async_trait;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMultiplexer;

impl NoOpMultiplexer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MultiplexerAdapter for NoOpMultiplexer {
    async fn has_session(&self, _session: &str) -> Result<bool, MultiplexerError> {
        Ok(false)
    }

    async fn new_session(&self, _session: &str, _cwd: &Path) -> Result<(), MultiplexerError> {
        Ok(())
    }

    async fn kill_session(&self, _session: &str) -> Result<(), MultiplexerError> {
        Ok(())
    }

    async fn split_window(&self, _session: &str, _cwd: &Path) -> Result<String, MultiplexerError> {
        Ok("noop-pane".to_string())
    }

    async fn send_keys(&self, _pane: &str, _text: &str) -> Result<(), MultiplexerError> {
        Ok(())
    }

    async fn capture_pane(&self, _pane: &str, _lines: u32) -> Result<String, MultiplexerError> {
        Ok(String::new())
    }

    async fn select_layout(&self, _session: &str, _layout: &str) -> Result<(), MultiplexerError> {
        Ok(())
    }

    async fn set_pane_option(&self, _pane: &str, _key: &str, _value: &str) -> Result<(), MultiplexerError> {
        Ok(())
    }

    async fn show_pane_option(&self, _pane: &str, _key: &str) -> Result<Option<String>, MultiplexerError> {
        Ok(None)
    }

    async fn kill_pane(&self, _pane: &str) -> Result<(), MultiplexerError> {
        Ok(())
    }

    async fn select_pane_title(&self, _pane: &str, _title: &str) -> Result<(), MultiplexerError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
