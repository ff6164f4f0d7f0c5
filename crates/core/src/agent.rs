// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identifier and persisted agent state (spec.md §3.1 AgentState).

use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Unique identifier for an agent instance (UUID v4, globally unique).
    pub struct AgentId;
}

/// Role an agent plays within its team, consulted by `octeam-engine::permissions`
/// and by `claimTask`'s hierarchical-topology check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentRole {
    Leader,
    Worker,
    Reviewer,
    TaskManager,
}

impl Default for AgentRole {
    fn default() -> Self {
        AgentRole::Worker
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentRole::Leader => write!(f, "leader"),
            AgentRole::Worker => write!(f, "worker"),
            AgentRole::Reviewer => write!(f, "reviewer"),
            AgentRole::TaskManager => write!(f, "task-manager"),
        }
    }
}

/// Lifecycle status of an agent (spec.md §3.1 AgentState status transitions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Spawning,
    Active,
    Idle,
    Inactive,
    ShuttingDown,
    Terminated,
}

impl AgentStatus {
    /// `spawning -> active | terminated`; `active <-> idle`;
    /// `{active|idle} -> shutting_down -> terminated`;
    /// `{active|idle} -> inactive -> terminated`; any -> `terminated` via force.
    pub fn can_transition_to(self, next: AgentStatus, forced: bool) -> bool {
        use AgentStatus::*;
        if forced && next == Terminated {
            return true;
        }
        matches!(
            (self, next),
            (Spawning, Active)
                | (Spawning, Terminated)
                | (Active, Idle)
                | (Idle, Active)
                | (Active, ShuttingDown)
                | (Idle, ShuttingDown)
                | (ShuttingDown, Terminated)
                | (Active, Inactive)
                | (Idle, Inactive)
                | (Inactive, Terminated)
        ) || self == next
    }

    pub fn is_active(self) -> bool {
        matches!(self, AgentStatus::Active | AgentStatus::Idle)
    }

    pub fn is_terminal(self) -> bool {
        self == AgentStatus::Terminated
    }
}

/// Source of a heartbeat update, recorded for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatSource {
    Explicit,
    SdkSessionIdle,
    SdkSessionUpdated,
    SdkToolExecuteAfter,
    PaneWatcher,
}

/// Persisted agent state (`agents/<agent-id>.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub name: String,
    pub team_name: String,
    pub role: AgentRole,
    pub model: String,
    #[serde(default)]
    pub provider_id: Option<String>,
    pub session_id: String,
    #[serde(default)]
    pub pane_id: Option<String>,
    pub server_port: u16,
    pub cwd: String,
    #[serde(default)]
    pub initial_prompt: Option<String>,
    pub color: String,
    pub status: AgentStatus,
    pub created_at: String,
    pub heartbeat_ts: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub terminated_at: Option<String>,
    #[serde(default)]
    pub consecutive_misses: u32,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub session_rotation_count: u32,
}

impl AgentRecord {
    /// `isActive` is derived from status, never stored independently.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
