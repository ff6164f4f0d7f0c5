// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octeam tool <name> --input '{...}'`: JSON-in/JSON-out passthrough for
//! every tool-surface operation (spec.md §6), for host-framework
//! integration testing without a language-specific client library.

use anyhow::{anyhow, Result};
use octeam_core::{
    AgentId, AgentRole, AgentStatus, CoordError, HeartbeatSource, TaskId, TaskInput, TaskPriority,
    TaskStatus, TaskUpdate, TeamTemplate,
};
use octeam_daemon::{Coordinator, SpawnAgentParams};
use octeam_engine::tasks::TaskFilter;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::output::{error_envelope, print_json};

pub async fn run(coordinator: &Coordinator, name: &str, input: &str) -> Result<()> {
    let value: Value = serde_json::from_str(input)
        .map_err(|err| anyhow!("invalid --input JSON: {err}"))?;

    match dispatch(coordinator, name, value).await {
        Ok(result) => {
            print_json(&result);
            Ok(())
        }
        Err(err) => {
            print_json(&error_envelope(err.category(), err.detail()));
            Err(anyhow!("{}: {}", err.category(), err.detail()))
        }
    }
}

fn field<T: serde::de::DeserializeOwned>(value: &Value, name: &str) -> Result<T, CoordError> {
    value
        .get(name)
        .cloned()
        .ok_or_else(|| CoordError::validation(format!("missing field: {name}")))
        .and_then(|v| serde_json::from_value(v).map_err(|e| CoordError::validation(e.to_string())))
}

fn optional_field<T: serde::de::DeserializeOwned>(value: &Value, name: &str) -> Result<Option<T>, CoordError> {
    match value.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| CoordError::validation(e.to_string())),
    }
}

/// `serde_json::to_value` over a plain data type can't practically fail,
/// but it's still fallible API — route it through `CoordError` rather than
/// reach for `unwrap`/`expect`.
fn to_json<T: serde::Serialize>(value: T) -> Result<Value, CoordError> {
    serde_json::to_value(value).map_err(|e| CoordError::corrupted(e.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
struct TaskInputDto {
    title: String,
    description: Option<String>,
    priority: Option<TaskPriority>,
    dependencies: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
struct TaskUpdateDto {
    title: Option<String>,
    description: Option<String>,
    priority: Option<TaskPriority>,
    status: Option<TaskStatus>,
    dependencies: Option<Vec<String>>,
}

async fn dispatch(coordinator: &Coordinator, name: &str, value: Value) -> Result<Value, CoordError> {
    match name {
        // ---- team ----------------------------------------------------------
        "spawn-team" => {
            let team_name: String = field(&value, "team_name")?;
            let leader: String = field(&value, "leader")?;
            let team = coordinator.spawn_team(&team_name, AgentId::new(leader))?;
            to_json(team)
        }
        "discover-teams" => {
            let teams = coordinator.discover_teams()?;
            to_json(teams)
        }
        "join-team" => {
            let team_name: String = field(&value, "team_name")?;
            let agent_id: String = field(&value, "agent_id")?;
            let agent_name: String = field(&value, "name")?;
            let role: String = field(&value, "role")?;
            let team = coordinator.join_team(&team_name, AgentId::new(agent_id), agent_name, role)?;
            to_json(team)
        }
        "get-team-info" => {
            let team_name: String = field(&value, "team_name")?;
            let team = coordinator.get_team_info(&team_name)?;
            to_json(team)
        }
        "delete-team" => {
            let team_name: String = field(&value, "team_name")?;
            coordinator.delete_team(&team_name)?;
            Ok(serde_json::json!({"success": true}))
        }

        // ---- messaging -------------------------------------------------------
        "send-message" => {
            let team_name: String = field(&value, "team_name")?;
            let from: String = field(&value, "from")?;
            let to: String = field(&value, "to")?;
            let body: String = field(&value, "body")?;
            let message = coordinator.send_message(&team_name, &AgentId::new(from), &AgentId::new(to), body)?;
            to_json(message)
        }
        "broadcast-message" => {
            let team_name: String = field(&value, "team_name")?;
            let from: String = field(&value, "from")?;
            let body: String = field(&value, "body")?;
            let message = coordinator.broadcast_message(&team_name, &AgentId::new(from), body)?;
            to_json(message)
        }
        "read-messages" => {
            let team_name: String = field(&value, "team_name")?;
            let agent_id: String = field(&value, "agent_id")?;
            let since: Option<String> = optional_field(&value, "since")?;
            let messages = coordinator.read_messages(&team_name, &AgentId::new(agent_id), since.as_deref())?;
            to_json(messages)
        }
        "poll-inbox" => {
            let team_name: String = field(&value, "team_name")?;
            let agent_id: String = field(&value, "agent_id")?;
            let since: Option<String> = optional_field(&value, "since")?;
            let timeout_ms: Option<u64> = optional_field(&value, "timeout_ms")?;
            let agent_id = AgentId::new(agent_id);
            let timeout = timeout_ms.map(Duration::from_millis);
            // `poll_inbox` blocks its calling thread; run it off the async
            // executor so a long poll can't starve other tool invocations.
            let messages = tokio::task::block_in_place(|| {
                coordinator.poll_inbox(&team_name, &agent_id, timeout, since.as_deref())
            })?;
            to_json(messages)
        }

        // ---- tasks -------------------------------------------------------------
        "create-task" => {
            let team_name: String = field(&value, "team_name")?;
            let dto: TaskInputDto = serde_json::from_value(value).map_err(|e| CoordError::validation(e.to_string()))?;
            let input = TaskInput {
                title: dto.title,
                description: dto.description,
                priority: dto.priority.unwrap_or_default(),
                dependencies: dto.dependencies.unwrap_or_default().into_iter().map(TaskId::new).collect(),
            };
            let task = coordinator.create_task(&team_name, input)?;
            to_json(task)
        }
        "get-tasks" => {
            let team_name: String = field(&value, "team_name")?;
            let status: Option<TaskStatus> = optional_field(&value, "status")?;
            let owner: Option<String> = optional_field(&value, "owner")?;
            let filter = TaskFilter { status, owner: owner.map(AgentId::new) };
            let tasks = coordinator.get_tasks(&team_name, &filter)?;
            to_json(tasks)
        }
        "claim-task" => {
            let team_name: String = field(&value, "team_name")?;
            let task_id: String = field(&value, "task_id")?;
            let agent_id: String = field(&value, "agent_id")?;
            let claimer_role: Option<AgentRole> = optional_field(&value, "claimer_role")?;
            let task = coordinator.claim_task(&team_name, &TaskId::new(task_id), &AgentId::new(agent_id), claimer_role)?;
            to_json(task)
        }
        "update-task" => {
            let team_name: String = field(&value, "team_name")?;
            let task_id: String = field(&value, "task_id")?;
            let dto: TaskUpdateDto = serde_json::from_value(value).map_err(|e| CoordError::validation(e.to_string()))?;
            let updates = TaskUpdate {
                title: dto.title,
                description: dto.description,
                priority: dto.priority,
                status: dto.status,
                dependencies: dto.dependencies.map(|ds| ds.into_iter().map(TaskId::new).collect()),
            };
            let task = coordinator.update_task(&team_name, &TaskId::new(task_id), updates)?;
            to_json(task)
        }

        // ---- agents --------------------------------------------------------------
        "spawn-agent" => {
            let team_name: String = field(&value, "team_name")?;
            let agent_name: String = field(&value, "name")?;
            let role: AgentRole = field(&value, "role")?;
            let model: Option<String> = optional_field(&value, "model")?;
            let provider_id: Option<String> = optional_field(&value, "provider_id")?;
            let project_path: Option<String> = optional_field(&value, "project_path")?;
            let initial_prompt: Option<String> = optional_field(&value, "initial_prompt")?;
            let agent = coordinator
                .spawn_agent(SpawnAgentParams {
                    team_name,
                    name: agent_name,
                    role,
                    model: model.unwrap_or_else(|| "claude-sonnet".to_string()),
                    provider_id,
                    project_path: project_path.unwrap_or_else(crate::env::project_path),
                    initial_prompt,
                })
                .await?;
            to_json(agent)
        }
        "kill-agent" => {
            let caller: String = field(&value, "caller")?;
            let target: String = field(&value, "target")?;
            let forced: Option<bool> = optional_field(&value, "forced")?;
            coordinator.kill_agent(&AgentId::new(caller), &AgentId::new(target), forced.unwrap_or(false)).await?;
            Ok(serde_json::json!({"success": true}))
        }
        "heartbeat" => {
            let agent_id: String = field(&value, "agent_id")?;
            let source: HeartbeatSource = field(&value, "source")?;
            let status: Option<AgentStatus> = optional_field(&value, "status")?;
            let agent = coordinator.heartbeat(&AgentId::new(agent_id), source, status)?;
            to_json(agent)
        }
        "get-agent-status" => {
            let agent_id: String = field(&value, "agent_id")?;
            let agent = coordinator.get_agent_status(&AgentId::new(agent_id))?;
            to_json(agent)
        }

        // ---- templates -------------------------------------------------------------
        "save-template" => {
            let template: TeamTemplate = serde_json::from_value(value).map_err(|e| CoordError::validation(e.to_string()))?;
            coordinator.save_template(&template)?;
            Ok(serde_json::json!({"success": true}))
        }
        "list-templates" => {
            let names = coordinator.list_templates()?;
            to_json(names)
        }
        "delete-template" => {
            let template_name: String = field(&value, "name")?;
            coordinator.delete_template(&template_name)?;
            Ok(serde_json::json!({"success": true}))
        }

        // ---- policy --------------------------------------------------------------
        "check-permission" => {
            let team_name: String = field(&value, "team_name")?;
            let role: Option<AgentRole> = optional_field(&value, "role")?;
            let operation: String = field(&value, "operation")?;
            coordinator.check_permission(&team_name, role, &operation)?;
            Ok(serde_json::json!({"success": true}))
        }

        other => Err(CoordError::validation(format!("unknown tool operation: {other}"))),
    }
}
