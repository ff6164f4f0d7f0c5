// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backing AI-agent-runtime server record (spec.md §3.1 ServerInfo, §4.4
//! Server controller). One server process is reused by all agents of a
//! project.

use serde::{Deserialize, Serialize};

/// Lowest port in the deterministic range (spec.md §3.1: `28000 + hash mod 1000`).
pub const PORT_BASE: u16 = 28000;
pub const PORT_RANGE: u16 = 1000;

/// `servers/<project-hash>/server.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub project_path: String,
    pub project_hash: String,
    pub pid: u32,
    pub port: u16,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    pub is_running: bool,
    #[serde(default)]
    pub active_sessions: u32,
    #[serde(default)]
    pub log_path: Option<String>,
    pub started_at: String,
    #[serde(default)]
    pub last_health_check: Option<String>,
}

fn default_hostname() -> String {
    "127.0.0.1".to_string()
}

impl ServerInfo {
    pub fn new(project_path: impl Into<String>, project_hash: impl Into<String>, pid: u32, port: u16, started_at: impl Into<String>) -> Self {
        Self {
            project_path: project_path.into(),
            project_hash: project_hash.into(),
            pid,
            port,
            hostname: default_hostname(),
            is_running: true,
            active_sessions: 0,
            log_path: None,
            started_at: started_at.into(),
            last_health_check: None,
        }
    }
}

/// Deterministic port derivation: `28000 + (first 16 bits of MD5(absolute
/// project path) mod 1000)` (spec.md §3.1 ServerInfo invariant).
pub fn derive_port(absolute_project_path: &str) -> u16 {
    use md5::{Digest, Md5};
    let digest = Md5::digest(absolute_project_path.as_bytes());
    let first_two_bytes = u16::from_be_bytes([digest[0], digest[1]]);
    PORT_BASE + (first_two_bytes % PORT_RANGE)
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
