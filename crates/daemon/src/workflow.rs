// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow monitor (spec.md §4.5): on every `task.completed`, compare the
//! ready-to-claim backlog against the team's active worker count, and
//! suggest assigning more agents to the leader when the backlog grows
//! faster than the team can work through it.

use std::sync::Arc;

use octeam_core::{AgentId, Clock, CoordResult, Event, IdGen, MessageType, Team, TaskStatus};
use octeam_engine::tasks::TaskFilter;
use octeam_storage::{lock_exclusive, read_validated, write_atomic, StorageRoot};

use crate::event_bus::EventBus;

const MONITOR_AGENT_ID: &str = "workflow-monitor";

fn read_team(root: &StorageRoot, team_name: &str) -> CoordResult<Team> {
    let path = root.team_config(team_name);
    read_validated(&path).map_err(octeam_core::CoordError::from)
}

/// Count of pending tasks with no remaining dependencies: the backlog the
/// leader could hand out right now.
fn unblocked_backlog(root: &StorageRoot, team_name: &str) -> CoordResult<usize> {
    let tasks = octeam_engine::tasks::get_tasks(
        root,
        team_name,
        &TaskFilter { status: Some(TaskStatus::Pending), owner: None },
    )?;
    Ok(tasks.iter().filter(|t| t.is_unblocked()).count())
}

/// *task.completed* handler (spec.md §4.5). Reads the team fresh under an
/// exclusive lock so the cooldown bookkeeping can't race a concurrent
/// suggestion from the same event.
fn handle_task_completed(root: &StorageRoot, clock: &dyn Clock, event: &Event) -> CoordResult<()> {
    let _guard = lock_exclusive(&root.team_lock(&event.team_name))?;
    let mut team = read_team(root, &event.team_name)?;

    let Some(workflow) = team.workflow.clone() else { return Ok(()) };
    if !workflow.enabled {
        return Ok(());
    }

    let active_workers = team.active_agent_count();
    if active_workers == 0 {
        return Ok(());
    }

    let backlog = unblocked_backlog(root, &event.team_name)?;
    if backlog < workflow.min_unblocked_tasks {
        return Ok(());
    }

    let ratio = backlog as f64 / active_workers as f64;
    if ratio < workflow.backlog_ratio_threshold {
        return Ok(());
    }

    let now_ms = clock.epoch_ms();
    if let Some(last) = workflow.last_suggestion_at_ms {
        if now_ms.saturating_sub(last) < workflow.cooldown_ms {
            return Ok(());
        }
    }

    let leader = team.leader.clone();
    let body = format!(
        "{backlog} unblocked task(s) against {active_workers} active worker(s) (ratio {ratio:.1} >= threshold {:.1}); consider spawning more agents",
        workflow.backlog_ratio_threshold
    );
    octeam_engine::messaging::send_typed(
        root,
        clock.now_iso8601(),
        &event.team_name,
        &AgentId::new(MONITOR_AGENT_ID),
        &leader,
        body,
        MessageType::TaskAssignment,
    )?;

    if let Some(workflow) = team.workflow.as_mut() {
        workflow.last_suggestion_at_ms = Some(now_ms);
    }
    write_atomic(&root.team_config(&event.team_name), &team).map_err(octeam_core::CoordError::from)
}

/// Subscribe the workflow monitor to `task.completed` events.
pub fn install(bus: &EventBus, root: Arc<StorageRoot>, _id_gen: Arc<dyn IdGen>, clock: Arc<dyn Clock>) {
    bus.subscribe(octeam_core::EventType::TaskCompleted, move |event| {
        handle_task_completed(&root, clock.as_ref(), event)
    });
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
