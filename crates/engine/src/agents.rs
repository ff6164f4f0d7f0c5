// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent record persistence (spec.md §3.1 AgentState, §4.4 registration and
//! heartbeats). Orchestration that reaches outside the filesystem — spawning
//! subprocesses, multiplexer panes, sessions — lives in `octeam-daemon`;
//! this module only reads and writes `agents/<id>.json` under the shared
//! `agents/.lock`.

use octeam_core::{AgentId, AgentRecord, AgentStatus, CoordError, CoordResult, HeartbeatSource};
use octeam_storage::{lock_exclusive, lock_shared, read_validated, write_atomic, StorageRoot};

fn read_agent(root: &StorageRoot, agent_id: &AgentId) -> CoordResult<AgentRecord> {
    let path = root.agent_file(agent_id.as_str());
    read_validated(&path).map_err(|e| match e {
        octeam_storage::StorageError::Io { .. } => {
            CoordError::not_found(format!("agent {agent_id}"))
        }
        other => other.into(),
    })
}

fn write_agent(root: &StorageRoot, agent: &AgentRecord) -> CoordResult<()> {
    write_atomic(&root.agent_file(agent.id.as_str()), agent).map_err(CoordError::from)
}

/// Persist a freshly constructed `AgentRecord` (spawnAgent's registration
/// step). Fails if an agent with this id already exists — ids are UUIDs,
/// so a collision means a caller reused one.
pub fn register_agent(root: &StorageRoot, agent: AgentRecord) -> CoordResult<AgentRecord> {
    let _guard = lock_exclusive(&root.agents_lock())?;
    if root.agent_file(agent.id.as_str()).exists() {
        return Err(CoordError::conflict(format!("agent {} already registered", agent.id)));
    }
    write_agent(root, &agent)?;
    Ok(agent)
}

/// *getAgentStatus*: shared lock, single agent.
pub fn get_agent(root: &StorageRoot, agent_id: &AgentId) -> CoordResult<AgentRecord> {
    let _guard = lock_shared(&root.agents_lock())?;
    read_agent(root, agent_id)
}

/// List every agent record under the storage root, optionally filtered to
/// one team. Corrupted records are skipped rather than failing the whole
/// listing (spec.md §7 propagation policy).
pub fn list_agents(root: &StorageRoot, team_name: Option<&str>) -> CoordResult<Vec<AgentRecord>> {
    let _guard = lock_shared(&root.agents_lock())?;
    let dir = root.agents_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut agents = Vec::new();
    for entry in std::fs::read_dir(&dir)
        .map_err(|e| CoordError::unavailable(format!("reading {}: {e}", dir.display())))?
    {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(".json") {
            continue;
        }
        let agent_id = AgentId::new(name.trim_end_matches(".json"));
        match read_agent(root, &agent_id) {
            Ok(agent) => agents.push(agent),
            Err(err) => tracing::warn!(agent_id = %agent_id, error = %err, "skipping unreadable agent record"),
        }
    }
    Ok(match team_name {
        Some(team) => agents.into_iter().filter(|a| a.team_name == team).collect(),
        None => agents,
    })
}

/// *heartbeat(agentId)* (spec.md §4.4): sets `heartbeatTs=now`,
/// `consecutiveMisses=0`, and optionally the status. Idempotent — calling
/// it N times only ever updates those fields (spec.md §8 round-trip
/// property).
pub fn heartbeat(
    root: &StorageRoot,
    now: impl Into<String>,
    agent_id: &AgentId,
    source: HeartbeatSource,
    status: Option<AgentStatus>,
) -> CoordResult<AgentRecord> {
    let now = now.into();
    let _guard = lock_exclusive(&root.agents_lock())?;

    let mut agent = read_agent(root, agent_id)?;
    agent.heartbeat_ts = now.clone();
    agent.consecutive_misses = 0;
    agent.updated_at = Some(now);
    if let Some(status) = status {
        if agent.status.can_transition_to(status, false) {
            agent.status = status;
        }
    }
    let _ = source; // recorded via tracing at the call site; not persisted per-field.
    write_agent(root, &agent)?;
    Ok(agent)
}

/// Apply an explicit status transition, rejecting any move the state
/// machine doesn't allow (spec.md §3.1 AgentState status transitions).
pub fn transition_status(
    root: &StorageRoot,
    now: impl Into<String>,
    agent_id: &AgentId,
    next: AgentStatus,
    forced: bool,
) -> CoordResult<AgentRecord> {
    let now = now.into();
    let _guard = lock_exclusive(&root.agents_lock())?;

    let mut agent = read_agent(root, agent_id)?;
    if !agent.status.can_transition_to(next, forced) {
        return Err(CoordError::conflict(format!(
            "invalid agent status transition: {:?} -> {:?}",
            agent.status, next
        )));
    }
    agent.status = next;
    agent.updated_at = Some(now.clone());
    if next == AgentStatus::Terminated {
        agent.terminated_at = Some(now);
    }
    write_agent(root, &agent)?;
    Ok(agent)
}

/// Increment `consecutiveMisses` (stale sweep, spec.md §4.4). Returns the
/// updated record so the caller can decide whether the miss count crossed
/// the inactive threshold.
pub fn record_missed_heartbeat(root: &StorageRoot, agent_id: &AgentId) -> CoordResult<AgentRecord> {
    let _guard = lock_exclusive(&root.agents_lock())?;
    let mut agent = read_agent(root, agent_id)?;
    agent.consecutive_misses += 1;
    write_agent(root, &agent)?;
    Ok(agent)
}

/// Record a session rotation after context-limit error recovery (spec.md
/// §4.4 Error recovery): new session id, bumped rotation count, fresh
/// heartbeat.
pub fn rotate_session(
    root: &StorageRoot,
    now: impl Into<String>,
    agent_id: &AgentId,
    new_session_id: impl Into<String>,
) -> CoordResult<AgentRecord> {
    let now = now.into();
    let _guard = lock_exclusive(&root.agents_lock())?;
    let mut agent = read_agent(root, agent_id)?;
    agent.session_id = new_session_id.into();
    agent.session_rotation_count += 1;
    agent.heartbeat_ts = now.clone();
    agent.updated_at = Some(now);
    write_agent(root, &agent)?;
    Ok(agent)
}

pub fn set_last_error(
    root: &StorageRoot,
    now: impl Into<String>,
    agent_id: &AgentId,
    error: impl Into<String>,
) -> CoordResult<AgentRecord> {
    let now = now.into();
    let _guard = lock_exclusive(&root.agents_lock())?;
    let mut agent = read_agent(root, agent_id)?;
    agent.last_error = Some(error.into());
    agent.updated_at = Some(now);
    write_agent(root, &agent)?;
    Ok(agent)
}

/// Remove an agent's persisted record (post-termination cleanup).
pub fn delete_agent(root: &StorageRoot, agent_id: &AgentId) -> CoordResult<()> {
    let _guard = lock_exclusive(&root.agents_lock())?;
    let path = root.agent_file(agent_id.as_str());
    if !path.exists() {
        return Err(CoordError::not_found(format!("agent {agent_id}")));
    }
    std::fs::remove_file(&path)
        .map_err(|e| CoordError::unavailable(format!("removing {}: {e}", path.display())))
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
