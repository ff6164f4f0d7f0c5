// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AI agent runtime adapter (spec.md §6 subprocess contracts: an
//! `opencode`-compatible server). Out of scope as a product per spec.md §1
//! ("the AI agent runtime ... consumed as an opaque event source for
//! heartbeats") — this module is exactly that opaque consumer: a subprocess
//! controller for `opencode serve`, an SDK client for session creation and
//! prompting, and an SSE consumer for the heartbeat/error-recovery event
//! stream.

mod http;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRuntime, RuntimeCall};

pub use http::HttpRuntime;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("server did not become ready: {0}")]
    NotReady(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("session not found: {0}")]
    SessionNotFound(String),
}

/// One event off the AI-agent-runtime's server-sent-event stream (spec.md
/// §6: `event.list()` yielding `{type, properties:{sessionID?, ...}}`).
#[derive(Debug, Clone)]
pub struct SdkEvent {
    pub event_type: String,
    pub session_id: Option<String>,
    /// `properties.error.message` (or similar), when the event carries one —
    /// `session.error`'s context-limit indicator is read from here.
    pub message: Option<String>,
}

/// Subprocess lifecycle for the backing `opencode serve` process (spec.md
/// §4.4 Server controller).
#[async_trait]
pub trait ServerController: Send + Sync + 'static {
    /// Launch `opencode serve --hostname H --port P`, stdout/stderr
    /// redirected to `log_path`. Returns the child's pid.
    async fn spawn(
        &self,
        hostname: &str,
        port: u16,
        cwd: &std::path::Path,
        log_path: &std::path::Path,
    ) -> Result<u32, RuntimeError>;

    /// `GET http://H:P/`, true on a 200 response.
    async fn probe_ready(&self, hostname: &str, port: u16) -> bool;

    /// Whether `pid` still refers to a live process.
    async fn is_alive(&self, pid: u32) -> bool;

    /// SIGTERM.
    async fn terminate(&self, pid: u32) -> Result<(), RuntimeError>;

    /// SIGKILL.
    async fn kill(&self, pid: u32) -> Result<(), RuntimeError>;
}

/// SDK operations against a running `opencode serve` process (spec.md §4.4
/// session creation, reliable prompt delivery; §6 `session.new`,
/// `session.messages`, `session.prompt`).
#[async_trait]
pub trait SdkClient: Send + Sync + 'static {
    /// `session.new`. Title format (`teams::<team>::agent::<id>::role::<role>`)
    /// is the caller's concern; this just creates the session.
    async fn create_session(
        &self,
        hostname: &str,
        port: u16,
        title: &str,
        directory: &str,
    ) -> Result<String, RuntimeError>;

    /// `session.messages(id)`, counted.
    async fn message_count(&self, hostname: &str, port: u16, session_id: &str) -> Result<usize, RuntimeError>;

    /// `session.prompt(id, parts, modelID?, providerID?)`.
    async fn send_prompt(
        &self,
        hostname: &str,
        port: u16,
        session_id: &str,
        prompt: &str,
        model_id: Option<&str>,
        provider_id: Option<&str>,
    ) -> Result<(), RuntimeError>;

    /// Subscribe to the server's SSE event stream (`event.list()`), yielding
    /// `session.idle|updated|error`, `tool.execute.after`, etc. Returns a
    /// channel the caller drains until the server goes away.
    async fn subscribe_events(
        &self,
        hostname: &str,
        port: u16,
    ) -> Result<mpsc::Receiver<SdkEvent>, RuntimeError>;
}
