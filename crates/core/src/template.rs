// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team templates: blueprints for `spawnTeamFromTemplate` (spec.md §4.7).

use crate::task::{TaskInput, TaskPriority};
use crate::team::{RoleDefinition, Topology, WorkflowConfig};
use serde::{Deserialize, Serialize};

/// A default task pre-populated when a team is created from a template.
/// Lighter than [`TaskInput`] (no cross-task id references yet — dependency
/// wiring between default tasks, if any, happens by title lookup at
/// instantiation time in `octeam-engine::templates`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Titles of other default tasks in this template that this one depends on.
    #[serde(default)]
    pub depends_on_titles: Vec<String>,
}

impl DefaultTask {
    pub fn into_task_input(self) -> TaskInput {
        TaskInput {
            title: self.title,
            description: self.description,
            priority: self.priority,
            dependencies: Vec::new(),
        }
    }
}

/// `templates/<name>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub topology: Topology,
    #[serde(default)]
    pub roles: Vec<RoleDefinition>,
    #[serde(default)]
    pub workflow_config: Option<WorkflowConfig>,
    #[serde(default)]
    pub default_tasks: Vec<DefaultTask>,
    pub created_at: String,
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
