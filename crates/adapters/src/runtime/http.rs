// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real `ServerController` + `SdkClient` implementation: spawns `opencode
//! serve` as a subprocess and talks to it over HTTP/SSE with `reqwest`.

use super::{RuntimeError, SdkClient, SdkEvent, ServerController};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::sync::mpsc;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SSE_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct HttpRuntime {
    client: reqwest::Client,
}

impl HttpRuntime {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    fn base_url(hostname: &str, port: u16) -> String {
        format!("http://{hostname}:{port}")
    }
}

#[async_trait]
impl ServerController for HttpRuntime {
    async fn spawn(
        &self,
        hostname: &str,
        port: u16,
        cwd: &Path,
        log_path: &Path,
    ) -> Result<u32, RuntimeError> {
        let log = tokio::fs::File::create(log_path)
            .await
            .map_err(|e| RuntimeError::NotReady(format!("cannot open log file: {e}")))?;
        let log_err = log
            .try_clone()
            .await
            .map_err(|e| RuntimeError::NotReady(format!("cannot clone log handle: {e}")))?;

        let child = tokio::process::Command::new("opencode")
            .arg("serve")
            .arg("--hostname")
            .arg(hostname)
            .arg("--port")
            .arg(port.to_string())
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(log.into_std().await)
            .stderr(log_err.into_std().await)
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| RuntimeError::NotReady(format!("spawn failed: {e}")))?;

        let pid = child
            .id()
            .ok_or_else(|| RuntimeError::NotReady("child exited immediately".into()))?;

        // Detach: the daemon tracks liveness by pid, not by holding the
        // tokio::process::Child handle (which would reap it on drop).
        std::mem::forget(child);
        Ok(pid)
    }

    async fn probe_ready(&self, hostname: &str, port: u16) -> bool {
        let url = Self::base_url(hostname, port);
        matches!(
            tokio::time::timeout(PROBE_TIMEOUT, self.client.get(url).send()).await,
            Ok(Ok(resp)) if resp.status().is_success()
        )
    }

    async fn is_alive(&self, pid: u32) -> bool {
        #[cfg(unix)]
        {
            // Signal 0 performs no-op error checking; ESRCH means gone.
            // SAFETY container: shells out to `kill -0` rather than raw libc
            // so this adapter stays free of `unsafe`.
            tokio::process::Command::new("kill")
                .arg("-0")
                .arg(pid.to_string())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map(|s| s.success())
                .unwrap_or(false)
        }
        #[cfg(not(unix))]
        {
            let _ = pid;
            false
        }
    }

    async fn terminate(&self, pid: u32) -> Result<(), RuntimeError> {
        send_signal(pid, "-TERM").await
    }

    async fn kill(&self, pid: u32) -> Result<(), RuntimeError> {
        send_signal(pid, "-KILL").await
    }
}

async fn send_signal(pid: u32, signal: &str) -> Result<(), RuntimeError> {
    let status = tokio::process::Command::new("kill")
        .arg(signal)
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| RuntimeError::RequestFailed(format!("kill {signal} failed: {e}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(RuntimeError::RequestFailed(format!("kill {signal} exited with {status}")))
    }
}

#[async_trait]
impl SdkClient for HttpRuntime {
    async fn create_session(
        &self,
        hostname: &str,
        port: u16,
        title: &str,
        directory: &str,
    ) -> Result<String, RuntimeError> {
        let url = format!("{}/session", Self::base_url(hostname, port));
        let resp = self
            .client
            .post(url)
            .json(&serde_json::json!({ "title": title, "directory": directory }))
            .send()
            .await
            .map_err(|e| RuntimeError::RequestFailed(e.to_string()))?;
        let body: serde_json::Value = resp
            .error_for_status()
            .map_err(|e| RuntimeError::RequestFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| RuntimeError::RequestFailed(e.to_string()))?;
        body.get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| RuntimeError::RequestFailed("response missing session id".into()))
    }

    async fn message_count(&self, hostname: &str, port: u16, session_id: &str) -> Result<usize, RuntimeError> {
        let url = format!("{}/session/{}/message", Self::base_url(hostname, port), session_id);
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RuntimeError::RequestFailed(e.to_string()))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RuntimeError::SessionNotFound(session_id.to_string()));
        }
        let body: serde_json::Value = resp
            .error_for_status()
            .map_err(|e| RuntimeError::RequestFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| RuntimeError::RequestFailed(e.to_string()))?;
        Ok(body.as_array().map(Vec::len).unwrap_or(0))
    }

    async fn send_prompt(
        &self,
        hostname: &str,
        port: u16,
        session_id: &str,
        prompt: &str,
        model_id: Option<&str>,
        provider_id: Option<&str>,
    ) -> Result<(), RuntimeError> {
        let url = format!("{}/session/{}/message", Self::base_url(hostname, port), session_id);
        let mut payload = serde_json::json!({
            "parts": [{ "type": "text", "text": prompt }],
        });
        if let Some(model) = model_id {
            payload["modelID"] = serde_json::Value::String(model.to_string());
        }
        if let Some(provider) = provider_id {
            payload["providerID"] = serde_json::Value::String(provider.to_string());
        }
        let resp = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RuntimeError::RequestFailed(e.to_string()))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RuntimeError::SessionNotFound(session_id.to_string()));
        }
        resp.error_for_status()
            .map_err(|e| RuntimeError::RequestFailed(e.to_string()))?;
        Ok(())
    }

    async fn subscribe_events(
        &self,
        hostname: &str,
        port: u16,
    ) -> Result<mpsc::Receiver<SdkEvent>, RuntimeError> {
        let url = format!("{}/event", Self::base_url(hostname, port));
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RuntimeError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| RuntimeError::RequestFailed(e.to_string()))?;

        let (tx, rx) = mpsc::channel(SSE_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut stream = resp.bytes_stream();
            let mut buf = String::new();
            while let Some(chunk) = stream.next().await {
                let Ok(chunk) = chunk else { break };
                buf.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(pos) = buf.find("\n\n") {
                    let frame = buf[..pos].to_string();
                    buf.drain(..pos + 2);
                    if let Some(event) = parse_sse_frame(&frame) {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
            }
        });
        Ok(rx)
    }
}

fn parse_sse_frame(frame: &str) -> Option<SdkEvent> {
    let data: String = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    if data.is_empty() {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(&data).ok()?;
    let event_type = value.get("type")?.as_str()?.to_string();
    let properties = value.get("properties");
    let session_id = properties
        .and_then(|p| p.get("sessionID").or_else(|| p.get("info").and_then(|i| i.get("id"))))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let message = properties
        .and_then(|p| p.get("error"))
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    Some(SdkEvent { event_type, session_id, message })
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
