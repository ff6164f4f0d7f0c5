// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixture builders shared by `octeam-core`'s own tests and by downstream
//! crates (enabled via the `test-support` feature).

use crate::agent::{AgentId, AgentRecord, AgentRole, AgentStatus};
use crate::task::{Task, TaskInput, TaskPriority, TaskStatus};
use crate::team::{Member, Team, Topology};

pub const FIXED_NOW: &str = "2024-01-01T00:00:00.000Z";

/// A team with a leader and no other members, for tests that don't care
/// about membership shape.
pub fn sample_team(name: &str) -> Team {
    Team::new(name, AgentId::new("leader-1"), FIXED_NOW)
}

/// A team with a leader plus `worker_count` flat-topology workers.
pub fn team_with_workers(name: &str, worker_count: usize) -> Team {
    let mut team = Team::new(name, AgentId::new("leader-1"), FIXED_NOW);
    team.topology = Topology::Flat;
    for i in 0..worker_count {
        team.members.push(Member {
            agent_id: AgentId::new(format!("worker-{i}")),
            name: format!("worker-{i}"),
            role: "worker".to_string(),
            joined_at: FIXED_NOW.to_string(),
        });
    }
    team
}

pub fn sample_task_input(title: &str) -> TaskInput {
    TaskInput {
        title: title.to_string(),
        description: None,
        priority: TaskPriority::Normal,
        dependencies: Vec::new(),
    }
}

pub fn sample_task(id: &str, title: &str) -> Task {
    Task::new(
        crate::task::TaskId::new(id),
        sample_task_input(title),
        FIXED_NOW,
    )
}

pub fn completed_task(id: &str, title: &str) -> Task {
    let mut task = sample_task(id, title);
    task.status = TaskStatus::Completed;
    task.completed_at = Some(FIXED_NOW.to_string());
    task
}

pub fn sample_agent(team_name: &str, role: AgentRole) -> AgentRecord {
    AgentRecord {
        id: AgentId::new("agent-1"),
        name: "agent-1".to_string(),
        team_name: team_name.to_string(),
        role,
        model: "claude-sonnet".to_string(),
        provider_id: None,
        session_id: "session-1".to_string(),
        pane_id: None,
        server_port: 28000,
        cwd: "/tmp/project".to_string(),
        initial_prompt: None,
        color: "#61afef".to_string(),
        status: AgentStatus::Spawning,
        created_at: FIXED_NOW.to_string(),
        heartbeat_ts: FIXED_NOW.to_string(),
        updated_at: None,
        terminated_at: None,
        consecutive_misses: 0,
        last_error: None,
        session_rotation_count: 0,
    }
}
