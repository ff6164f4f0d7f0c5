// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake multiplexer adapter for tests: records every call and lets tests
//! script pane output and liveness.

use super::{MultiplexerAdapter, MultiplexerError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum MuxCall {
    HasSession { session: String },
    NewSession { session: String, cwd: PathBuf },
    KillSession { session: String },
    SplitWindow { session: String, cwd: PathBuf },
    SendKeys { pane: String, text: String },
    CapturePane { pane: String, lines: u32 },
    SelectLayout { session: String, layout: String },
    SetPaneOption { pane: String, key: String, value: String },
    KillPane { pane: String },
    SelectPaneTitle { pane: String, title: String },
}

#[derive(Debug, Clone, Default)]
struct FakePane {
    output: String,
    options: HashMap<String, String>,
    alive: bool,
}

struct Inner {
    sessions: HashMap<String, bool>,
    panes: HashMap<String, FakePane>,
    calls: Vec<MuxCall>,
    next_pane: u64,
}

/// Fake multiplexer adapter for tests. Thread-safe and cloneable so the
/// same fake can be shared between the code under test and its assertions.
#[derive(Clone)]
pub struct FakeMultiplexer {
    inner: Arc<Mutex<Inner>>,
}

impl Default for FakeMultiplexer {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                sessions: HashMap::new(),
                panes: HashMap::new(),
                calls: Vec::new(),
                next_pane: 0,
            })),
        }
    }
}

impl FakeMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<MuxCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_pane_output(&self, pane: &str, text: impl Into<String>) {
        self.inner
            .lock()
            .panes
            .entry(pane.to_string())
            .or_insert_with(|| FakePane { alive: true, ..Default::default() })
            .output = text.into();
    }

    pub fn kill_pane_externally(&self, pane: &str) {
        if let Some(p) = self.inner.lock().panes.get_mut(pane) {
            p.alive = false;
        }
    }
}

#[async_trait]
impl MultiplexerAdapter for FakeMultiplexer {
    async fn has_session(&self, session: &str) -> Result<bool, MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::HasSession { session: session.to_string() });
        Ok(inner.sessions.get(session).copied().unwrap_or(false))
    }

    async fn new_session(&self, session: &str, cwd: &Path) -> Result<(), MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::NewSession {
            session: session.to_string(),
            cwd: cwd.to_path_buf(),
        });
        inner.sessions.insert(session.to_string(), true);
        Ok(())
    }

    async fn kill_session(&self, session: &str) -> Result<(), MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::KillSession { session: session.to_string() });
        inner.sessions.remove(session);
        Ok(())
    }

    async fn split_window(&self, session: &str, cwd: &Path) -> Result<String, MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::SplitWindow {
            session: session.to_string(),
            cwd: cwd.to_path_buf(),
        });
        inner.next_pane += 1;
        let pane = format!("%{}", inner.next_pane);
        inner.panes.insert(pane.clone(), FakePane { alive: true, ..Default::default() });
        Ok(pane)
    }

    async fn send_keys(&self, pane: &str, text: &str) -> Result<(), MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::SendKeys { pane: pane.to_string(), text: text.to_string() });
        if !inner.panes.contains_key(pane) {
            return Err(MultiplexerError::NotFound(pane.to_string()));
        }
        Ok(())
    }

    async fn capture_pane(&self, pane: &str, lines: u32) -> Result<String, MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::CapturePane { pane: pane.to_string(), lines });
        match inner.panes.get(pane) {
            Some(p) => Ok(p.output.clone()),
            None => Err(MultiplexerError::NotFound(pane.to_string())),
        }
    }

    async fn select_layout(&self, session: &str, layout: &str) -> Result<(), MultiplexerError> {
        self.inner.lock().calls.push(MuxCall::SelectLayout {
            session: session.to_string(),
            layout: layout.to_string(),
        });
        Ok(())
    }

    async fn set_pane_option(&self, pane: &str, key: &str, value: &str) -> Result<(), MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::SetPaneOption {
            pane: pane.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
        inner
            .panes
            .entry(pane.to_string())
            .or_insert_with(|| FakePane { alive: true, ..Default::default() })
            .options
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn show_pane_option(&self, pane: &str, key: &str) -> Result<Option<String>, MultiplexerError> {
        Ok(self
            .inner
            .lock()
            .panes
            .get(pane)
            .and_then(|p| p.options.get(key).cloned()))
    }

    async fn kill_pane(&self, pane: &str) -> Result<(), MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::KillPane { pane: pane.to_string() });
        inner.panes.remove(pane);
        Ok(())
    }

    async fn select_pane_title(&self, pane: &str, title: &str) -> Result<(), MultiplexerError> {
        self.inner.lock().calls.push(MuxCall::SelectPaneTitle {
            pane: pane.to_string(),
            title: title.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
