// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch rules and the capped audit log (spec.md §3.1 DispatchRule,
//! DispatchLogEntry, §4.5 Event Bus & Dispatch Engine).

use serde::{Deserialize, Serialize};

/// The event taxonomy a dispatch rule may match on (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TaskCreated,
    TaskCompleted,
    TaskUnblocked,
    AgentIdle,
    AgentTerminated,
    TeamCreated,
    SessionIdle,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::TaskCreated => "task.created",
            EventType::TaskCompleted => "task.completed",
            EventType::TaskUnblocked => "task.unblocked",
            EventType::AgentIdle => "agent.idle",
            EventType::AgentTerminated => "agent.terminated",
            EventType::TeamCreated => "team.created",
            EventType::SessionIdle => "session.idle",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    UnblockedTasks,
    ActiveAgents,
}

/// A dispatch rule's condition, evaluated against the triggering event's
/// payload or against team-wide resource counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    SimpleMatch {
        /// Dotted path into the event payload, e.g. `"task.priority"`.
        field: String,
        operator: ConditionOperator,
        value: serde_json::Value,
    },
    ResourceCount {
        resource: ResourceKind,
        operator: ConditionOperator,
        value: f64,
    },
}

/// The action a dispatch rule performs once its condition passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    AssignTask,
    NotifyLeader { message: String },
    Log { message: String },
}

/// A configured event -> condition -> action rule (spec.md §3.1 DispatchRule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRule {
    pub id: String,
    pub event_type: EventType,
    #[serde(default)]
    pub condition: Option<Condition>,
    pub action: Action,
    /// Lower runs first.
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// One audit-log entry for an executed (or skipped) dispatch rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchLogEntry {
    pub id: String,
    pub timestamp: String,
    pub rule_id: String,
    pub event_type: EventType,
    pub success: bool,
    pub details: String,
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
