// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake AI-agent-runtime adapter for tests: records every call, lets tests
//! script readiness/liveness/session state, and feeds scripted SSE events.

use super::{RuntimeError, SdkClient, SdkEvent, ServerController};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum RuntimeCall {
    Spawn { hostname: String, port: u16, cwd: PathBuf },
    ProbeReady { hostname: String, port: u16 },
    IsAlive { pid: u32 },
    Terminate { pid: u32 },
    Kill { pid: u32 },
    CreateSession { title: String, directory: String },
    MessageCount { session_id: String },
    SendPrompt { session_id: String, prompt: String },
    SubscribeEvents,
}

struct Inner {
    calls: Vec<RuntimeCall>,
    ready: bool,
    alive_pids: HashMap<u32, bool>,
    next_pid: u32,
    sessions: HashMap<String, usize>,
    scripted_events: Vec<SdkEvent>,
}

/// Fake AI-agent-runtime adapter. Thread-safe and cloneable so the same fake
/// can drive both the code under test and its assertions.
#[derive(Clone)]
pub struct FakeRuntime {
    inner: Arc<Mutex<Inner>>,
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                calls: Vec::new(),
                ready: true,
                alive_pids: HashMap::new(),
                next_pid: 1000,
                sessions: HashMap::new(),
                scripted_events: Vec::new(),
            })),
        }
    }
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_ready(&self, ready: bool) {
        self.inner.lock().ready = ready;
    }

    pub fn kill_externally(&self, pid: u32) {
        self.inner.lock().alive_pids.insert(pid, false);
    }

    pub fn script_events(&self, events: Vec<SdkEvent>) {
        self.inner.lock().scripted_events = events;
    }
}

#[async_trait]
impl ServerController for FakeRuntime {
    async fn spawn(
        &self,
        hostname: &str,
        port: u16,
        cwd: &Path,
        _log_path: &Path,
    ) -> Result<u32, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::Spawn {
            hostname: hostname.to_string(),
            port,
            cwd: cwd.to_path_buf(),
        });
        let pid = inner.next_pid;
        inner.next_pid += 1;
        inner.alive_pids.insert(pid, true);
        Ok(pid)
    }

    async fn probe_ready(&self, hostname: &str, port: u16) -> bool {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::ProbeReady { hostname: hostname.to_string(), port });
        inner.ready
    }

    async fn is_alive(&self, pid: u32) -> bool {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::IsAlive { pid });
        inner.alive_pids.get(&pid).copied().unwrap_or(false)
    }

    async fn terminate(&self, pid: u32) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::Terminate { pid });
        inner.alive_pids.insert(pid, false);
        Ok(())
    }

    async fn kill(&self, pid: u32) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::Kill { pid });
        inner.alive_pids.insert(pid, false);
        Ok(())
    }
}

#[async_trait]
impl SdkClient for FakeRuntime {
    async fn create_session(
        &self,
        _hostname: &str,
        _port: u16,
        title: &str,
        directory: &str,
    ) -> Result<String, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::CreateSession {
            title: title.to_string(),
            directory: directory.to_string(),
        });
        let id = format!("ses_{}", inner.sessions.len() + 1);
        inner.sessions.insert(id.clone(), 0);
        Ok(id)
    }

    async fn message_count(&self, _hostname: &str, _port: u16, session_id: &str) -> Result<usize, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::MessageCount { session_id: session_id.to_string() });
        inner
            .sessions
            .get(session_id)
            .copied()
            .ok_or_else(|| RuntimeError::SessionNotFound(session_id.to_string()))
    }

    async fn send_prompt(
        &self,
        _hostname: &str,
        _port: u16,
        session_id: &str,
        prompt: &str,
        _model_id: Option<&str>,
        _provider_id: Option<&str>,
    ) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::SendPrompt {
            session_id: session_id.to_string(),
            prompt: prompt.to_string(),
        });
        match inner.sessions.get_mut(session_id) {
            Some(count) => {
                *count += 1;
                Ok(())
            }
            None => Err(RuntimeError::SessionNotFound(session_id.to_string())),
        }
    }

    async fn subscribe_events(&self, _hostname: &str, _port: u16) -> Result<mpsc::Receiver<SdkEvent>, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::SubscribeEvents);
        let events = inner.scripted_events.clone();
        drop(inner);

        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            let _ = tx.send(event).await;
        }
        Ok(rx)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
