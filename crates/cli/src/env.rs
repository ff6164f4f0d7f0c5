// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable surface (spec.md §6): the handful of `OPENCODE_*`
//! variables the host framework sets before invoking `octeam`.

use octeam_core::{AgentId, AgentRole};

pub fn team_name() -> Option<String> {
    std::env::var("OPENCODE_TEAM_NAME").ok()
}

pub fn agent_id_or(default: impl Into<String>) -> AgentId {
    std::env::var("OPENCODE_AGENT_ID")
        .map(AgentId::new)
        .unwrap_or_else(|_| AgentId::new(default.into()))
}

pub fn agent_name_or_else(default: impl FnOnce() -> String) -> String {
    std::env::var("OPENCODE_AGENT_NAME").unwrap_or_else(|_| default())
}

/// `OPENCODE_AGENT_TYPE` carries the role as a kebab-case string
/// (`leader`, `worker`, `reviewer`, `task-manager`); unrecognized or unset
/// falls back to `worker`, matching [`AgentRole`]'s own default.
pub fn agent_role() -> AgentRole {
    match std::env::var("OPENCODE_AGENT_TYPE").as_deref() {
        Ok("leader") => AgentRole::Leader,
        Ok("reviewer") => AgentRole::Reviewer,
        Ok("task-manager") => AgentRole::TaskManager,
        _ => AgentRole::Worker,
    }
}

pub fn agent_model() -> String {
    std::env::var("OPENCODE_AGENT_MODEL").unwrap_or_else(|_| "claude-sonnet".to_string())
}

pub fn agent_provider() -> Option<String> {
    std::env::var("OPENCODE_AGENT_PROVIDER").ok()
}

pub fn initial_prompt() -> Option<String> {
    std::env::var("OPENCODE_INITIAL_PROMPT").ok()
}

/// `OPENCODE_PROJECT_ROOT` if set, else the current working directory.
/// `StorageRoot::new` applies the same override independently; this keeps
/// agent records' `project_path` field consistent with where the storage
/// tree actually lives.
pub fn project_path() -> String {
    std::env::var("OPENCODE_PROJECT_ROOT").unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| ".".to_string())
    })
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
