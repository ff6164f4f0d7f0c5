// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task state machine and dependency graph (spec.md §3.1 Task, §4.2 Task Engine).

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a task instance.
    pub struct TaskId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Normal,
    Low,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// The forward-only status state machine (spec.md §4.2 VALID_TRANSITIONS).
    /// `reassignAgentTasks`'s `InProgress -> Pending` reset is the sole
    /// sanctioned backward transition and is deliberately not reachable
    /// through this table — it bypasses `updateTask` entirely.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        match (self, next) {
            (Pending, InProgress) => true,
            (InProgress, Completed) => true,
            (a, b) if a == b => true, // same-state is a no-op, not an error
            _ => false,
        }
    }
}

/// A task belonging to a team's task queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub claimed_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub owner: Option<AgentId>,
    /// Task ids this task is blocked by.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    /// Denormalized reverse of `dependencies` across the team's task set:
    /// `self.id` appears in `dep.blocks` for every `dep` in `dependencies`.
    #[serde(default)]
    pub blocks: Vec<TaskId>,
    #[serde(default)]
    pub warning: Option<String>,
}

/// Input for `createTask`.
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub dependencies: Vec<TaskId>,
}

/// A partial update for `updateTask`. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub dependencies: Option<Vec<TaskId>>,
}

impl Task {
    pub fn new(id: TaskId, input: TaskInput, created_at: impl Into<String>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: TaskStatus::Pending,
            created_at: created_at.into(),
            updated_at: None,
            claimed_at: None,
            completed_at: None,
            owner: None,
            dependencies: input.dependencies,
            blocks: Vec::new(),
            warning: None,
        }
    }

    pub fn is_unblocked(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn has_dependency(&self, id: &TaskId) -> bool {
        self.dependencies.iter().any(|d| d == id)
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
