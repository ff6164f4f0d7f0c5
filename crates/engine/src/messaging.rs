// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messaging & inboxes (spec.md §4.3): per-agent append-only inboxes,
//! typed messages, long-polling reads, and the structured shutdown
//! protocol built on top of them.

use octeam_core::{AgentId, CoordError, CoordResult, Inbox, Message, MessageType, Team, BROADCAST};
use octeam_storage::{lock_exclusive, read_validated, write_atomic, StorageRoot};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(30_000);

fn read_team(root: &StorageRoot, team_name: &str) -> CoordResult<Team> {
    let path = root.team_config(team_name);
    read_validated(&path).map_err(|e| match e {
        octeam_storage::StorageError::Io { .. } => {
            CoordError::not_found(format!("team {team_name}"))
        }
        other => other.into(),
    })
}

fn read_inbox(root: &StorageRoot, team_name: &str, agent_id: &str) -> CoordResult<Inbox> {
    let path = root.inbox_file(team_name, agent_id);
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_validated(&path).map_err(CoordError::from)
}

fn write_inbox(root: &StorageRoot, team_name: &str, agent_id: &str, inbox: &Inbox) -> CoordResult<()> {
    write_atomic(&root.inbox_file(team_name, agent_id), inbox).map_err(CoordError::from)
}

fn append_message(root: &StorageRoot, team_name: &str, agent_id: &str, message: Message) -> CoordResult<()> {
    let mut inbox = read_inbox(root, team_name, agent_id)?;
    inbox.push(message);
    write_inbox(root, team_name, agent_id, &inbox)
}

/// *write* (spec.md §4.3): direct agent-to-agent message.
pub fn write(
    root: &StorageRoot,
    now: impl Into<String>,
    team_name: &str,
    from: &AgentId,
    to: &AgentId,
    body: impl Into<String>,
) -> CoordResult<Message> {
    let now = now.into();
    let _guard = lock_exclusive(&root.team_lock(team_name))?;

    let team = read_team(root, team_name)?;
    if !team.is_member(to) {
        return Err(CoordError::not_found(format!("agent {to} is not a member of {team_name}")));
    }

    let message = Message::new(from.clone(), to.as_str(), body, now);
    append_message(root, team_name, to.as_str(), message.clone())?;
    Ok(message)
}

/// *sendTyped* (spec.md §4.3): same as `write` but with an explicit type.
pub fn send_typed(
    root: &StorageRoot,
    now: impl Into<String>,
    team_name: &str,
    from: &AgentId,
    to: &AgentId,
    body: impl Into<String>,
    msg_type: MessageType,
) -> CoordResult<Message> {
    let now = now.into();
    let _guard = lock_exclusive(&root.team_lock(team_name))?;

    let team = read_team(root, team_name)?;
    if !team.is_member(to) {
        return Err(CoordError::not_found(format!("agent {to} is not a member of {team_name}")));
    }

    let message = Message::new(from.clone(), to.as_str(), body, now).with_type(msg_type);
    append_message(root, team_name, to.as_str(), message.clone())?;
    Ok(message)
}

/// *broadcast* (spec.md §4.3): delivered to every member except the sender.
pub fn broadcast(
    root: &StorageRoot,
    now: impl Into<String>,
    team_name: &str,
    from: &AgentId,
    body: impl Into<String>,
) -> CoordResult<Message> {
    let now = now.into();
    let body = body.into();
    let _guard = lock_exclusive(&root.team_lock(team_name))?;

    let team = read_team(root, team_name)?;
    let recipients: Vec<AgentId> = team.members.iter().map(|m| m.agent_id.clone()).collect();

    let message = Message::new(from.clone(), BROADCAST, body, now)
        .with_recipients(recipients.clone());

    for recipient in &recipients {
        if recipient == from {
            continue;
        }
        append_message(root, team_name, recipient.as_str(), message.clone())?;
    }

    Ok(message)
}

/// *readMessages* (spec.md §4.3): flips `read` on the returned subset only.
pub fn read_messages(
    root: &StorageRoot,
    team_name: &str,
    agent_id: &AgentId,
    since: Option<&str>,
) -> CoordResult<Vec<Message>> {
    let _guard = lock_exclusive(&root.team_lock(team_name))?;

    let mut inbox = read_inbox(root, team_name, agent_id.as_str())?;
    let mut matched_indices = Vec::new();
    for (i, message) in inbox.iter().enumerate() {
        let after_since = since.map(|s| message.timestamp.as_str() > s).unwrap_or(true);
        if after_since {
            matched_indices.push(i);
        }
    }

    for &i in &matched_indices {
        inbox[i].read = true;
    }

    let matched: Vec<Message> = matched_indices.iter().map(|&i| inbox[i].clone()).collect();
    write_inbox(root, team_name, agent_id.as_str(), &inbox)?;
    Ok(matched)
}

/// *pollInbox* (spec.md §4.3): sleeps in 500ms increments; returns `[]` on
/// timeout rather than blocking indefinitely (FR-008).
pub fn poll_inbox(
    root: &StorageRoot,
    team_name: &str,
    agent_id: &AgentId,
    timeout: Option<Duration>,
    since: Option<&str>,
) -> CoordResult<Vec<Message>> {
    let deadline = std::time::Instant::now() + timeout.unwrap_or(DEFAULT_POLL_TIMEOUT);
    loop {
        if root.inbox_file(team_name, agent_id.as_str()).exists() {
            let messages = read_messages(root, team_name, agent_id, since)?;
            if !messages.is_empty() {
                return Ok(messages);
            }
        }
        if std::time::Instant::now() >= deadline {
            return Ok(Vec::new());
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// *requestShutdown* (spec.md §4.3 shutdown protocol, P5).
///
/// spec.md §9 open question (b): the source silently succeeds for a
/// non-member caller. We keep that behavior rather than guess at an
/// unspecified rejection — see DESIGN.md.
pub fn request_shutdown(
    root: &StorageRoot,
    now: impl Into<String>,
    team_name: &str,
    agent_id: &AgentId,
) -> CoordResult<()> {
    let now = now.into();
    let _guard = lock_exclusive(&root.team_lock(team_name))?;

    let mut team = read_team(root, team_name)?;
    team.shutdown_approvals.insert(agent_id.clone());
    let leader = team.leader.clone();
    write_atomic(&root.team_config(team_name), &team).map_err(CoordError::from)?;

    if agent_id != &leader {
        let message = Message::new(agent_id.clone(), leader.as_str(), "shutdown requested", now)
            .with_type(MessageType::ShutdownRequest);
        append_message(root, team_name, leader.as_str(), message)?;
    }

    Ok(())
}

/// *approveShutdown* (spec.md §4.3 shutdown protocol, P5).
pub fn approve_shutdown(
    root: &StorageRoot,
    now: impl Into<String>,
    team_name: &str,
    agent_id: &AgentId,
) -> CoordResult<()> {
    let now = now.into();
    let _guard = lock_exclusive(&root.team_lock(team_name))?;

    let mut team = read_team(root, team_name)?;
    let already_requesting: Vec<AgentId> = team
        .shutdown_approvals
        .iter()
        .filter(|id| *id != agent_id)
        .cloned()
        .collect();
    team.shutdown_approvals.insert(agent_id.clone());
    write_atomic(&root.team_config(team_name), &team).map_err(CoordError::from)?;

    for requester in already_requesting {
        let message = Message::new(agent_id.clone(), requester.as_str(), "shutdown approved", now.clone())
            .with_type(MessageType::ShutdownApproved);
        append_message(root, team_name, requester.as_str(), message)?;
    }

    Ok(())
}

/// *shouldShutdown* (spec.md §4.3): true if the leader approved, or
/// everyone did.
pub fn should_shutdown(root: &StorageRoot, team_name: &str) -> CoordResult<bool> {
    let team = read_team(root, team_name)?;
    let leader_approved = team.shutdown_approvals.contains(&team.leader);
    let all_approved = !team.members.is_empty()
        && team.members.iter().all(|m| team.shutdown_approvals.contains(&m.agent_id));
    Ok(leader_approved || all_approved)
}

#[cfg(test)]
#[path = "messaging_tests.rs"]
mod tests;
