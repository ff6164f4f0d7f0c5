// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team configuration: membership, topology, role definitions, workflow
//! config, and the dispatch rules/log that live alongside it (spec.md §3.1).

use crate::agent::AgentId;
use crate::dispatch::{DispatchLogEntry, DispatchRule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum number of dispatch log entries retained per team; oldest evicted
/// on append (spec.md §3.1 Team invariants).
pub const MAX_DISPATCH_LOG: usize = 500;

/// Whether any worker may claim a task, or only the leader/task-manager may.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    Flat,
    Hierarchical,
}

impl Default for Topology {
    fn default() -> Self {
        Topology::Flat
    }
}

/// A member of a team. Immutable once added; removal rewrites the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub agent_id: AgentId,
    pub name: String,
    /// Role/type string, e.g. "leader", "worker", "reviewer", "task-manager".
    pub role: String,
    pub joined_at: String,
}

/// Per-role permission whitelist/blacklist, used by `octeam-engine::permissions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: String,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(default)]
    pub denied_tools: Vec<String>,
}

/// Workflow monitor thresholds (spec.md §4.5 Workflow monitor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Minimum ratio of unblocked_tasks / active_workers to trigger a
    /// suggestion to the leader.
    #[serde(default = "default_backlog_ratio")]
    pub backlog_ratio_threshold: f64,
    /// Minimum number of unblocked tasks required before a suggestion fires.
    #[serde(default = "default_min_unblocked")]
    pub min_unblocked_tasks: u32,
    /// Cooldown between suggestions, in milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_suggestion_at_ms: Option<u64>,
}

fn default_backlog_ratio() -> f64 {
    2.0
}

fn default_min_unblocked() -> u32 {
    3
}

fn default_cooldown_ms() -> u64 {
    5 * 60 * 1000
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backlog_ratio_threshold: default_backlog_ratio(),
            min_unblocked_tasks: default_min_unblocked(),
            cooldown_ms: default_cooldown_ms(),
            last_suggestion_at_ms: None,
        }
    }
}

/// Team configuration (`teams/<team-name>/config.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub created_at: String,
    pub leader: AgentId,
    pub members: Vec<Member>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topology: Topology,
    #[serde(default)]
    pub roles: Vec<RoleDefinition>,
    #[serde(default)]
    pub workflow: Option<WorkflowConfig>,
    #[serde(default)]
    pub template_source: Option<String>,
    #[serde(default)]
    pub dispatch_rules: Vec<DispatchRule>,
    #[serde(default)]
    pub dispatch_log: Vec<DispatchLogEntry>,
    #[serde(default)]
    pub shutdown_approvals: HashSet<AgentId>,
}

impl Team {
    pub fn new(name: impl Into<String>, leader: AgentId, created_at: impl Into<String>) -> Self {
        let created_at = created_at.into();
        Self {
            name: name.into(),
            created_at: created_at.clone(),
            members: vec![Member {
                agent_id: leader.clone(),
                name: "leader".to_string(),
                role: "leader".to_string(),
                joined_at: created_at,
            }],
            leader,
            description: None,
            topology: Topology::Flat,
            roles: Vec::new(),
            workflow: None,
            template_source: None,
            dispatch_rules: Vec::new(),
            dispatch_log: Vec::new(),
            shutdown_approvals: HashSet::new(),
        }
    }

    pub fn is_member(&self, agent_id: &AgentId) -> bool {
        self.members.iter().any(|m| &m.agent_id == agent_id)
    }

    pub fn member(&self, agent_id: &AgentId) -> Option<&Member> {
        self.members.iter().find(|m| &m.agent_id == agent_id)
    }

    pub fn role_definition(&self, role: &str) -> Option<&RoleDefinition> {
        self.roles.iter().find(|r| r.name == role)
    }

    /// Append a dispatch log entry, trimming the oldest if over capacity
    /// (spec.md §3.1 Team invariant: dispatch log length <= 500).
    pub fn push_dispatch_log(&mut self, entry: DispatchLogEntry) {
        self.dispatch_log.push(entry);
        if self.dispatch_log.len() > MAX_DISPATCH_LOG {
            let overflow = self.dispatch_log.len() - MAX_DISPATCH_LOG;
            self.dispatch_log.drain(0..overflow);
        }
    }

    /// Active (non-leader) member count, used by `resource_count(active_agents)`.
    pub fn active_agent_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.agent_id != self.leader)
            .count()
    }
}

#[cfg(test)]
#[path = "team_tests.rs"]
mod tests;
