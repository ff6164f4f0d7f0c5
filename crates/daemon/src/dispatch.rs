// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch engine (spec.md §4.5): subscribes to every taxonomy event type,
//! evaluates each enabled rule in priority order against the triggering
//! event and the team's current state, executes the matched action, and
//! appends a capped audit log entry.

use octeam_core::{
    Action, AgentId, AgentRole, AgentStatus, Clock, Condition, ConditionOperator, CoordError,
    CoordResult, DispatchLogEntry, Event, EventType, IdGen, MessageType, ResourceKind, Task,
    TaskPriority, TaskStatus, Team,
};
use octeam_storage::{lock_exclusive, read_validated, write_atomic, StorageRoot};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::event_bus::EventBus;

/// Recursion guard (spec.md §4.5): actions may emit new events; a chain
/// deeper than this is logged and dropped rather than recursing forever.
pub const MAX_DISPATCH_DEPTH: u32 = 3;

thread_local! {
    static DEPTH: AtomicU32 = const { AtomicU32::new(0) };
}

fn read_team(root: &StorageRoot, team_name: &str) -> CoordResult<Team> {
    read_validated(&root.team_config(team_name)).map_err(CoordError::from)
}

fn write_team(root: &StorageRoot, team_name: &str, team: &Team) -> CoordResult<()> {
    write_atomic(&root.team_config(team_name), team).map_err(CoordError::from)
}

fn numeric_cmp(op: ConditionOperator, a: f64, b: f64) -> bool {
    match op {
        ConditionOperator::Eq => a == b,
        ConditionOperator::Neq => a != b,
        ConditionOperator::Gt => a > b,
        ConditionOperator::Lt => a < b,
        ConditionOperator::Gte => a >= b,
        ConditionOperator::Lte => a <= b,
    }
}

fn lexicographic_cmp(op: ConditionOperator, a: &str, b: &str) -> bool {
    match op {
        ConditionOperator::Eq => a == b,
        ConditionOperator::Neq => a != b,
        ConditionOperator::Gt => a > b,
        ConditionOperator::Lt => a < b,
        ConditionOperator::Gte => a >= b,
        ConditionOperator::Lte => a <= b,
    }
}

fn unblocked_tasks(root: &StorageRoot, team_name: &str) -> usize {
    octeam_engine::tasks::get_tasks(root, team_name, &Default::default())
        .map(|tasks| {
            tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Pending && t.is_unblocked())
                .count()
        })
        .unwrap_or(0)
}

/// *simple_match*/*resource_count* condition evaluation (spec.md §4.5
/// Condition semantics).
fn evaluate_condition(root: &StorageRoot, team: &Team, event: &Event, condition: &Condition) -> bool {
    match condition {
        Condition::SimpleMatch { field, operator, value } => {
            let Some(actual) = event.get_path(field) else { return false };
            match (actual.as_f64(), value.as_f64()) {
                (Some(a), Some(b)) => numeric_cmp(*operator, a, b),
                _ => {
                    let a = actual.as_str().map(str::to_string).unwrap_or_else(|| actual.to_string());
                    let b = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                    lexicographic_cmp(*operator, &a, &b)
                }
            }
        }
        Condition::ResourceCount { resource, operator, value } => {
            let count = match resource {
                ResourceKind::UnblockedTasks => unblocked_tasks(root, &team.name) as f64,
                ResourceKind::ActiveAgents => team.active_agent_count() as f64,
            };
            numeric_cmp(*operator, count, *value)
        }
    }
}

/// Highest-priority pending, unblocked task: priority (`high` < `normal` <
/// `low`) then `createdAt` ascending (spec.md §4.5 `assign_task`).
fn pick_unblocked_task(mut tasks: Vec<Task>) -> Option<Task> {
    tasks.retain(|t| t.status == TaskStatus::Pending && t.is_unblocked());
    tasks.sort_by(|a, b| {
        priority_rank(a.priority)
            .cmp(&priority_rank(b.priority))
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    tasks.into_iter().next()
}

fn priority_rank(p: TaskPriority) -> u8 {
    match p {
        TaskPriority::High => 0,
        TaskPriority::Normal => 1,
        TaskPriority::Low => 2,
    }
}

fn first_idle_agent(root: &StorageRoot, team_name: &str) -> Option<AgentId> {
    octeam_engine::agents::list_agents(root, Some(team_name))
        .ok()?
        .into_iter()
        .find(|a| matches!(a.status, AgentStatus::Active | AgentStatus::Idle))
        .map(|a| a.id)
}

/// A sub-event an action wants dispatched once the triggering event's
/// team-config lock is released. Actions must not call `bus.emit` (and
/// thus re-enter `handle_event`) while the outer `handle_event` still
/// holds `root.team_lock(team_name)` — `fs2`'s POSIX `flock` is per
/// file-descriptor, not reentrant, so a same-team recursive acquire from
/// inside the held lock would block forever. Deferring emission lets the
/// caller drop the guard first.
struct PendingEvent {
    event_type: EventType,
    payload: Vec<(&'static str, String)>,
}

/// Execute a matched rule's action, returning a human-readable outcome for
/// the audit log plus any sub-event the action wants dispatched once the
/// team lock is released (spec.md §4.5 Actions).
fn execute_action(
    root: &StorageRoot,
    clock: &dyn Clock,
    team_name: &str,
    action: &Action,
) -> (bool, String, Option<PendingEvent>) {
    match action {
        Action::AssignTask => {
            let Some(agent_id) = first_idle_agent(root, team_name) else {
                return (false, "no-op: no idle agent available".to_string(), None);
            };
            let tasks = octeam_engine::tasks::get_tasks(root, team_name, &Default::default())
                .unwrap_or_default();
            let Some(task) = pick_unblocked_task(tasks) else {
                return (false, "no-op: no unblocked pending task".to_string(), None);
            };
            let claimer_role = octeam_engine::agents::get_agent(root, &agent_id).ok().map(|a| a.role);
            match octeam_engine::tasks::claim_task(
                root,
                clock.now_iso8601(),
                team_name,
                &task.id,
                &agent_id,
                claimer_role,
            ) {
                Ok(claimed) => {
                    let pending = PendingEvent {
                        event_type: EventType::AgentIdle,
                        payload: vec![
                            ("agent_id", agent_id.as_str().to_string()),
                            ("task_id", claimed.id.as_str().to_string()),
                        ],
                    };
                    (true, format!("assigned task {} to agent {agent_id}", claimed.id), Some(pending))
                }
                Err(err) => (false, format!("assign_task failed: {err}"), None),
            }
        }
        Action::NotifyLeader { message } => {
            let Ok(team) = read_team(root, team_name) else {
                return (false, "no-op: team not found".to_string(), None);
            };
            let engine_agent = AgentId::new("dispatch-engine");
            match octeam_engine::messaging::send_typed(
                root,
                clock.now_iso8601(),
                team_name,
                &engine_agent,
                &team.leader,
                message,
                MessageType::Plain,
            ) {
                Ok(_) => (true, format!("notified leader: {message}"), None),
                Err(err) => (false, format!("notify_leader failed: {err}"), None),
            }
        }
        Action::Log { message } => (true, message.clone(), None),
    }
}

/// Build and synchronously dispatch a sub-event onto `bus`, honoring the
/// recursion-depth cap (spec.md §4.5 Recursion guard). Called only after
/// the triggering event's team lock has been released.
fn dispatch_event(
    id_gen: &dyn IdGen,
    clock: &dyn Clock,
    bus: &EventBus,
    team_name: &str,
    pending: PendingEvent,
    depth: u32,
) {
    if depth > MAX_DISPATCH_DEPTH {
        tracing::warn!(team = team_name, event_type = %pending.event_type, depth, "dispatch recursion cap reached, dropping");
        return;
    }
    let mut event = Event::new(id_gen.next(), pending.event_type, team_name, clock.now_iso8601());
    for (key, value) in pending.payload {
        event = event.with_payload(key, value);
    }
    bus.emit(&event);
}

/// Run the dispatch pipeline for one event (spec.md §4.5 steps 1-3):
/// collect matching enabled rules sorted by priority, evaluate conditions,
/// execute actions, and append an audit-log entry per rule.
pub fn handle_event(
    root: &StorageRoot,
    id_gen: &dyn IdGen,
    clock: &dyn Clock,
    bus: &EventBus,
    event: &Event,
) -> CoordResult<()> {
    let depth = DEPTH.with(|d| d.load(Ordering::SeqCst));
    if depth >= MAX_DISPATCH_DEPTH {
        tracing::warn!(event_type = %event.event_type, depth, "dispatch depth cap reached, skipping rule evaluation");
        return Ok(());
    }

    // The team-config lock is scoped to this block so it is dropped before
    // any pending sub-event collected below is emitted. `Action::AssignTask`
    // success re-emits `AgentIdle`, which `install` routes straight back
    // into `handle_event` for the same team; emitting it while `_guard` is
    // still alive would make the second `lock_exclusive` call on the same
    // `.lock` path block forever (flock is per open-file-description, not
    // reentrant).
    let mut pending_events = Vec::new();
    {
        let _guard = lock_exclusive(&root.team_lock(&event.team_name))?;
        let mut team = read_team(root, &event.team_name)?;

        let mut rules: Vec<_> = team
            .dispatch_rules
            .iter()
            .filter(|r| r.enabled && r.event_type == event.event_type)
            .cloned()
            .collect();
        rules.sort_by_key(|r| r.priority);

        let mut log_entries = Vec::new();
        for rule in rules {
            let matched = match &rule.condition {
                Some(cond) => evaluate_condition(root, &team, event, cond),
                None => true,
            };
            if !matched {
                continue;
            }

            let (success, details, pending) =
                execute_action(root, clock, &event.team_name, &rule.action);
            if let Some(pending) = pending {
                pending_events.push(pending);
            }

            log_entries.push(DispatchLogEntry {
                id: id_gen.next(),
                timestamp: clock.now_iso8601(),
                rule_id: rule.id.clone(),
                event_type: event.event_type,
                success,
                details,
            });
        }

        if !log_entries.is_empty() {
            // Re-read to avoid clobbering a concurrent mutation made by the
            // actions just executed (claim_task etc. touch the task dir,
            // not the team config).
            team = read_team(root, &event.team_name)?;
            for entry in log_entries {
                team.push_dispatch_log(entry);
            }
            write_team(root, &event.team_name, &team)?;
        }
    }

    DEPTH.with(|d| d.fetch_add(1, Ordering::SeqCst));
    for pending in pending_events {
        dispatch_event(id_gen, clock, bus, &event.team_name, pending, depth + 1);
    }
    DEPTH.with(|d| d.fetch_sub(1, Ordering::SeqCst));

    Ok(())
}

/// Subscribe the dispatch engine to every taxonomy event type on `bus`.
/// `bus` is cloned into each closure since [`EventBus`] is a cheap `Arc`
/// handle (spec.md §5: "the event bus handler set is process-local").
pub fn install(
    bus: &EventBus,
    root: Arc<StorageRoot>,
    id_gen: Arc<dyn IdGen>,
    clock: Arc<dyn Clock>,
) {
    for event_type in [
        EventType::TaskCreated,
        EventType::TaskCompleted,
        EventType::TaskUnblocked,
        EventType::AgentIdle,
        EventType::AgentTerminated,
        EventType::TeamCreated,
        EventType::SessionIdle,
    ] {
        let root = Arc::clone(&root);
        let id_gen = Arc::clone(&id_gen);
        let clock = Arc::clone(&clock);
        let bus_for_handler = bus.clone();
        bus.subscribe(event_type, move |event| {
            handle_event(&root, id_gen.as_ref(), clock.as_ref(), &bus_for_handler, event)
        });
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
