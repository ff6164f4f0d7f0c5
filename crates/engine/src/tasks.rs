// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task engine (spec.md §4.2): dependency graph enforcement, forward-only
//! status machine, cascade unblocking, soft-blocking claims.

use octeam_core::{
    AgentId, AgentRole, CoordError, CoordResult, Event, EventType, IdGen, Task, TaskId, TaskInput,
    TaskPriority, TaskStatus, TaskUpdate, Team, Topology,
};
use octeam_storage::{lock_exclusive, lock_shared, read_validated, StorageRoot};
use std::collections::{HashSet, VecDeque};

/// The outcome of a mutating task operation: the task as it now stands, plus
/// any events the caller's event bus should dispatch. Engine functions never
/// emit directly — they have no bus to emit onto.
#[derive(Debug, Clone)]
pub struct TaskMutation {
    pub task: Task,
    pub events: Vec<Event>,
}

fn list_task_ids(root: &StorageRoot, team_name: &str) -> CoordResult<Vec<TaskId>> {
    let dir = root.tasks_dir(team_name);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut ids = Vec::new();
    for entry in std::fs::read_dir(&dir)
        .map_err(|e| CoordError::unavailable(format!("reading {}: {e}", dir.display())))?
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(stripped) = name.strip_suffix(".json") {
            ids.push(TaskId::new(stripped));
        }
    }
    Ok(ids)
}

fn read_task(root: &StorageRoot, team_name: &str, task_id: &TaskId) -> CoordResult<Task> {
    let path = root.task_file(team_name, task_id.as_str());
    read_validated(&path).map_err(|e| match e {
        octeam_storage::StorageError::Io { .. } => CoordError::not_found(format!("task {task_id}")),
        other => other.into(),
    })
}

fn write_task(root: &StorageRoot, team_name: &str, task: &Task) -> CoordResult<()> {
    let path = root.task_file(team_name, task.id.as_str());
    octeam_storage::write_atomic(&path, task).map_err(CoordError::from)
}

fn read_team(root: &StorageRoot, team_name: &str) -> CoordResult<Team> {
    let path = root.team_config(team_name);
    read_validated(&path)
        .map_err(|e| match e {
            octeam_storage::StorageError::Io { .. } => {
                CoordError::not_found(format!("team {team_name}"))
            }
            other => other.into(),
        })
}

fn priority_str(p: TaskPriority) -> &'static str {
    match p {
        TaskPriority::High => "high",
        TaskPriority::Normal => "normal",
        TaskPriority::Low => "low",
    }
}

/// BFS from the candidate dependency set, following each visited task's own
/// `dependencies`. Cycle iff we ever reach `new_id`.
fn detect_cycle(
    root: &StorageRoot,
    team_name: &str,
    new_id: &TaskId,
    start: &[TaskId],
) -> CoordResult<bool> {
    let mut queue: VecDeque<TaskId> = start.iter().cloned().collect();
    let mut visited: HashSet<TaskId> = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if &current == new_id {
            return Ok(true);
        }
        if !visited.insert(current.clone()) {
            continue;
        }
        let task = read_task(root, team_name, &current)?;
        for dep in task.dependencies {
            queue.push_back(dep);
        }
    }
    Ok(false)
}

/// *createTask* (spec.md §4.2).
pub fn create_task(
    root: &StorageRoot,
    id_gen: &dyn IdGen,
    now: impl Into<String>,
    team_name: &str,
    input: TaskInput,
) -> CoordResult<TaskMutation> {
    let now = now.into();

    if !root.team_config(team_name).exists() {
        return Err(CoordError::not_found(format!("team {team_name}")));
    }

    let _guard = lock_exclusive(&root.task_lock(team_name))?;

    let id = TaskId::new(id_gen.next());

    for dep in &input.dependencies {
        if !root.task_file(team_name, dep.as_str()).exists() {
            return Err(CoordError::not_found(format!("dependency task {dep}")));
        }
    }

    if detect_cycle(root, team_name, &id, &input.dependencies)? {
        return Err(CoordError::conflict("circular dependency"));
    }

    let task = Task::new(id.clone(), input, now.clone());
    write_task(root, team_name, &task)?;

    for dep in &task.dependencies {
        let mut dep_task = read_task(root, team_name, dep)?;
        if !dep_task.blocks.contains(&task.id) {
            dep_task.blocks.push(task.id.clone());
            write_task(root, team_name, &dep_task)?;
        }
    }

    let event = Event::new(id_gen.next(), EventType::TaskCreated, team_name, now)
        .with_payload("task_id", task.id.as_str())
        .with_payload("priority", priority_str(task.priority));

    Ok(TaskMutation { task, events: vec![event] })
}

/// *getTask* (spec.md §4.2): shared lock, single task.
pub fn get_task(root: &StorageRoot, team_name: &str, task_id: &TaskId) -> CoordResult<Task> {
    let _guard = lock_shared(&root.task_lock(team_name))?;
    read_task(root, team_name, task_id)
}

/// Filters for *getTasks*.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub owner: Option<AgentId>,
}

/// *getTasks(filters)* (spec.md §4.2): shared lock, all tasks in the team.
/// Corrupted individual files are logged and skipped rather than failing
/// the whole listing (spec.md §7 propagation policy).
pub fn get_tasks(
    root: &StorageRoot,
    team_name: &str,
    filter: &TaskFilter,
) -> CoordResult<Vec<Task>> {
    let _guard = lock_shared(&root.task_lock(team_name))?;
    let ids = list_task_ids(root, team_name)?;
    let mut tasks = Vec::new();
    for id in ids {
        match read_task(root, team_name, &id) {
            Ok(task) => tasks.push(task),
            Err(err) => {
                tracing::warn!(task_id = %id, error = %err, "skipping unreadable task file");
            }
        }
    }
    Ok(tasks
        .into_iter()
        .filter(|t| filter.status.map(|s| s == t.status).unwrap_or(true))
        .filter(|t| {
            filter
                .owner
                .as_ref()
                .map(|o| t.owner.as_ref() == Some(o))
                .unwrap_or(true)
        })
        .collect())
}

/// *updateTask* (spec.md §4.2).
pub fn update_task(
    root: &StorageRoot,
    id_gen: &dyn IdGen,
    now: impl Into<String>,
    team_name: &str,
    task_id: &TaskId,
    updates: TaskUpdate,
) -> CoordResult<TaskMutation> {
    let now = now.into();
    let _guard = lock_exclusive(&root.task_lock(team_name))?;

    let mut task = read_task(root, team_name, task_id)?;
    let mut events = Vec::new();

    if let Some(new_deps) = &updates.dependencies {
        for dep in new_deps {
            if !root.task_file(team_name, dep.as_str()).exists() {
                return Err(CoordError::not_found(format!("dependency task {dep}")));
            }
        }
        if detect_cycle(root, team_name, task_id, new_deps)? {
            return Err(CoordError::conflict("circular dependency"));
        }

        let old: HashSet<_> = task.dependencies.iter().cloned().collect();
        let new: HashSet<_> = new_deps.iter().cloned().collect();

        for removed in old.difference(&new) {
            if let Ok(mut dep_task) = read_task(root, team_name, removed) {
                dep_task.blocks.retain(|b| b != task_id);
                write_task(root, team_name, &dep_task)?;
            }
        }
        for added in new.difference(&old) {
            let mut dep_task = read_task(root, team_name, added)?;
            if !dep_task.blocks.contains(task_id) {
                dep_task.blocks.push(task_id.clone());
                write_task(root, team_name, &dep_task)?;
            }
        }

        task.dependencies = new_deps.clone();
    }

    if let Some(title) = updates.title {
        task.title = title;
    }
    if let Some(description) = updates.description {
        task.description = Some(description);
    }
    if let Some(priority) = updates.priority {
        task.priority = priority;
    }

    if let Some(new_status) = updates.status {
        if new_status != task.status {
            if !task.status.can_transition_to(new_status) {
                return Err(CoordError::conflict(format!(
                    "Invalid status transition: {:?} -> {:?}",
                    task.status, new_status
                )));
            }
            task.status = new_status;
            task.updated_at = Some(now.clone());
            if new_status == TaskStatus::Completed {
                task.completed_at = Some(now.clone());
            }
        }
    }

    write_task(root, team_name, &task)?;

    if task.status == TaskStatus::Completed {
        events.push(
            Event::new(id_gen.next(), EventType::TaskCompleted, team_name, now.clone())
                .with_payload("task_id", task.id.as_str()),
        );

        let ids = list_task_ids(root, team_name)?;
        for other_id in ids {
            if &other_id == task_id {
                continue;
            }
            // Best-effort: a single corrupted dependent must not stall the
            // rest of the cascade (spec.md §7).
            let mut other = match read_task(root, team_name, &other_id) {
                Ok(t) => t,
                Err(_) => continue,
            };
            if !other.has_dependency(task_id) {
                continue;
            }
            other.dependencies.retain(|d| d != task_id);
            let newly_unblocked = other.is_unblocked() && other.status == TaskStatus::Pending;
            if newly_unblocked
                && other
                    .warning
                    .as_deref()
                    .map(|w| w.contains("dependencies are not met"))
                    .unwrap_or(false)
            {
                other.warning = None;
            }
            if write_task(root, team_name, &other).is_err() {
                continue;
            }
            if newly_unblocked {
                events.push(
                    Event::new(id_gen.next(), EventType::TaskUnblocked, team_name, now.clone())
                        .with_payload("task_id", other.id.as_str()),
                );
            }
        }
    }

    Ok(TaskMutation { task, events })
}

/// *deleteTask* (spec.md §4.2).
pub fn delete_task(root: &StorageRoot, team_name: &str, task_id: &TaskId) -> CoordResult<()> {
    let _guard = lock_exclusive(&root.task_lock(team_name))?;

    let ids = list_task_ids(root, team_name)?;
    for other_id in &ids {
        if other_id == task_id {
            continue;
        }
        if let Ok(other) = read_task(root, team_name, other_id) {
            if other.has_dependency(task_id) {
                return Err(CoordError::conflict(format!("task {task_id} has dependents")));
            }
        }
    }

    let task = read_task(root, team_name, task_id)?;
    for dep in &task.dependencies {
        if let Ok(mut dep_task) = read_task(root, team_name, dep) {
            dep_task.blocks.retain(|b| b != task_id);
            let _ = write_task(root, team_name, &dep_task);
        }
    }

    let path = root.task_file(team_name, task_id.as_str());
    std::fs::remove_file(&path)
        .map_err(|e| CoordError::unavailable(format!("removing {}: {e}", path.display())))
}

/// *claimTask* (spec.md §4.2): soft-blocking, hierarchical-topology guard.
pub fn claim_task(
    root: &StorageRoot,
    now: impl Into<String>,
    team_name: &str,
    task_id: &TaskId,
    agent_id: &AgentId,
    claimer_role: Option<AgentRole>,
) -> CoordResult<Task> {
    let now = now.into();
    let _guard = lock_exclusive(&root.task_lock(team_name))?;

    let team = read_team(root, team_name)?;
    if team.topology == Topology::Hierarchical {
        let is_leader = &team.leader == agent_id;
        let is_privileged = matches!(
            claimer_role,
            Some(AgentRole::Leader) | Some(AgentRole::TaskManager)
        );
        if !is_leader && !is_privileged {
            return Err(CoordError::permission(
                "only the leader or a task-manager may claim tasks in a hierarchical team",
            ));
        }
    }

    let mut task = read_task(root, team_name, task_id)?;
    if task.status != TaskStatus::Pending {
        return Err(CoordError::conflict("not available"));
    }

    let mut unmet = Vec::new();
    for dep in &task.dependencies {
        match read_task(root, team_name, dep) {
            Ok(dep_task) if dep_task.status != TaskStatus::Completed => unmet.push(dep.clone()),
            Err(_) => unmet.push(dep.clone()),
            _ => {}
        }
    }

    task.status = TaskStatus::InProgress;
    task.owner = Some(agent_id.clone());
    task.claimed_at = Some(now.clone());
    task.updated_at = Some(now);
    task.warning = if unmet.is_empty() {
        None
    } else {
        Some(format!(
            "dependencies are not met: {}",
            unmet.iter().map(|d| d.as_str()).collect::<Vec<_>>().join(", ")
        ))
    };

    write_task(root, team_name, &task)?;
    Ok(task)
}

/// *reassignAgentTasks* (spec.md §4.2): the sole sanctioned backward
/// transition, used by agent-death recovery. Returns the reassigned ids.
pub fn reassign_agent_tasks(
    root: &StorageRoot,
    team_name: &str,
    agent_id: &AgentId,
) -> CoordResult<Vec<TaskId>> {
    let _guard = lock_exclusive(&root.task_lock(team_name))?;

    let ids = list_task_ids(root, team_name)?;
    let mut reassigned = Vec::new();
    for id in ids {
        let mut task = match read_task(root, team_name, &id) {
            Ok(t) => t,
            Err(_) => continue,
        };
        if task.status == TaskStatus::InProgress && task.owner.as_ref() == Some(agent_id) {
            task.status = TaskStatus::Pending;
            task.owner = None;
            task.claimed_at = None;
            task.warning = Some(format!("Reassigned: previous owner {agent_id} terminated"));
            write_task(root, team_name, &task)?;
            reassigned.push(id);
        }
    }
    Ok(reassigned)
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
