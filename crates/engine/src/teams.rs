// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team lifecycle operations backing the `team:` tool surface (spec.md §6):
//! `spawn-team`, `discover-teams`, `join-team`, `get-team-info`,
//! `delete-team`. Not broken out into its own numbered component in
//! spec.md §4, but implied by the Team entity (§3.1) and lifecycle
//! ownership rules (§3.2).

use octeam_core::{AgentId, CoordError, CoordResult, Member, Team};
use octeam_storage::{lock_exclusive, lock_shared, read_validated, write_atomic, StorageRoot};

fn read_team(root: &StorageRoot, team_name: &str) -> CoordResult<Team> {
    let path = root.team_config(team_name);
    read_validated(&path).map_err(|e| match e {
        octeam_storage::StorageError::Io { .. } => {
            CoordError::not_found(format!("team {team_name}"))
        }
        other => other.into(),
    })
}

/// *spawnTeam*: not idempotent, fails on duplicate name (spec.md §6).
pub fn spawn_team(
    root: &StorageRoot,
    now: impl Into<String>,
    team_name: &str,
    leader: AgentId,
) -> CoordResult<Team> {
    let _guard = lock_exclusive(&root.team_lock(team_name))?;

    if root.team_config(team_name).exists() {
        return Err(CoordError::conflict(format!("team {team_name} already exists")));
    }

    let team = Team::new(team_name, leader, now);
    write_atomic(&root.team_config(team_name), &team).map_err(CoordError::from)?;
    Ok(team)
}

/// *discoverTeams*: list every team under the storage root. Corrupted
/// configs are skipped rather than failing the whole listing (spec.md §7).
pub fn discover_teams(root: &StorageRoot) -> CoordResult<Vec<Team>> {
    let dir = root.teams_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut teams = Vec::new();
    for entry in std::fs::read_dir(&dir)
        .map_err(|e| CoordError::unavailable(format!("reading {}: {e}", dir.display())))?
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        match read_team(root, &name) {
            Ok(team) => teams.push(team),
            Err(err) => tracing::warn!(team = %name, error = %err, "skipping unreadable team config"),
        }
    }
    Ok(teams)
}

/// *joinTeam*: fails on duplicate member id (spec.md §6).
pub fn join_team(
    root: &StorageRoot,
    now: impl Into<String>,
    team_name: &str,
    agent_id: AgentId,
    name: impl Into<String>,
    role: impl Into<String>,
) -> CoordResult<Team> {
    let now = now.into();
    let _guard = lock_exclusive(&root.team_lock(team_name))?;

    let mut team = read_team(root, team_name)?;
    if team.is_member(&agent_id) {
        return Err(CoordError::conflict(format!("agent {agent_id} is already a member")));
    }

    team.members.push(Member {
        agent_id,
        name: name.into(),
        role: role.into(),
        joined_at: now,
    });
    write_atomic(&root.team_config(team_name), &team).map_err(CoordError::from)?;
    Ok(team)
}

/// *getTeamInfo*: shared lock, single team config.
pub fn get_team_info(root: &StorageRoot, team_name: &str) -> CoordResult<Team> {
    let _guard = lock_shared(&root.team_lock(team_name))?;
    read_team(root, team_name)
}

/// *deleteTeam*: spec.md §9 open question (c) — the source deletes
/// unconditionally even with active agents; we preserve that behavior
/// rather than invent a new precondition (see DESIGN.md). Removes the
/// team's config, inboxes, and task directory; does not touch
/// `agents/<id>.json` records, which is the agent lifecycle's concern.
pub fn delete_team(root: &StorageRoot, team_name: &str) -> CoordResult<()> {
    let _guard = lock_exclusive(&root.team_lock(team_name))?;

    if !root.team_config(team_name).exists() {
        return Err(CoordError::not_found(format!("team {team_name}")));
    }

    let team_dir = root.team_dir(team_name);
    std::fs::remove_dir_all(&team_dir)
        .map_err(|e| CoordError::unavailable(format!("removing {}: {e}", team_dir.display())))?;

    let tasks_dir = root.tasks_dir(team_name);
    if tasks_dir.exists() {
        std::fs::remove_dir_all(&tasks_dir).map_err(|e| {
            CoordError::unavailable(format!("removing {}: {e}", tasks_dir.display()))
        })?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "teams_tests.rs"]
mod tests;
