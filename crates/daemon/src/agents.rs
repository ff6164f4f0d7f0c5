// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle orchestration (spec.md §4.4 spawnAgent, shutdown/kill,
//! error recovery): the only module in this crate that drives the
//! multiplexer and AI-agent-runtime adapters together with the engine's
//! pure persistence operations.

use std::sync::Arc;
use std::time::Duration;

use octeam_adapters::{MultiplexerAdapter, MultiplexerError, RuntimeError, SdkClient, ServerController};
use octeam_core::{
    AgentId, AgentRecord, AgentRole, AgentStatus, Clock, CoordError, CoordResult, Event, EventType,
    IdGen,
};
use octeam_storage::StorageRoot;

use crate::event_bus::EventBus;
use crate::server;

const PROMPT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const PROMPT_POLL_TIMEOUT: Duration = Duration::from_secs(5);
const PROMPT_MAX_ATTEMPTS: u32 = 3;
const PROMPT_RETRY_WAIT: Duration = Duration::from_secs(2);

/// Parameters for [`spawn_agent`] (spec.md §4.4 spawnAgent).
pub struct SpawnAgentParams {
    pub team_name: String,
    pub name: String,
    pub role: AgentRole,
    pub model: String,
    pub provider_id: Option<String>,
    pub project_path: String,
    pub initial_prompt: Option<String>,
}

/// `sendPromptReliable(port, sessionId, prompt)` (spec.md §4.4): post, then
/// poll the message count until it strictly increases, retrying the whole
/// post+poll cycle up to `PROMPT_MAX_ATTEMPTS` times.
async fn send_prompt_reliable(
    runtime: &Arc<dyn SdkClient>,
    hostname: &str,
    port: u16,
    session_id: &str,
    prompt: &str,
) -> bool {
    for attempt in 1..=PROMPT_MAX_ATTEMPTS {
        let before = match runtime.message_count(hostname, port, session_id).await {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(attempt, error = %err, "message_count failed before prompt");
                tokio::time::sleep(PROMPT_RETRY_WAIT).await;
                continue;
            }
        };
        if let Err(err) = runtime.send_prompt(hostname, port, session_id, prompt, None, None).await {
            tracing::warn!(attempt, error = %err, "send_prompt failed");
            tokio::time::sleep(PROMPT_RETRY_WAIT).await;
            continue;
        }

        let deadline = std::time::Instant::now() + PROMPT_POLL_TIMEOUT;
        loop {
            match runtime.message_count(hostname, port, session_id).await {
                Ok(count) if count > before => return true,
                _ => {}
            }
            if std::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(PROMPT_POLL_INTERVAL).await;
        }

        if attempt < PROMPT_MAX_ATTEMPTS {
            tokio::time::sleep(PROMPT_RETRY_WAIT).await;
        }
    }
    false
}

fn to_coord_error(err: MultiplexerError) -> CoordError {
    CoordError::unavailable(err.to_string())
}

fn to_coord_runtime_error(err: RuntimeError) -> CoordError {
    CoordError::unavailable(err.to_string())
}

/// *spawnAgent* (spec.md §4.4): validate team, ensure session+server, split
/// a pane, register the agent, deliver the initial prompt, then mark it
/// active. Cleans up the color and pane on any failure before
/// registration; leaves the agent in `spawning` on a post-registration
/// failure so the leader can recover manually.
#[allow(clippy::too_many_arguments)]
pub async fn spawn_agent(
    root: &StorageRoot,
    id_gen: &dyn IdGen,
    clock: &dyn Clock,
    bus: &EventBus,
    multiplexer: &Arc<dyn MultiplexerAdapter>,
    server_controller: &Arc<dyn ServerController>,
    sdk_client: &Arc<dyn SdkClient>,
    params: SpawnAgentParams,
) -> CoordResult<AgentRecord> {
    let now = clock.now_iso8601();

    let team = octeam_engine::teams::get_team_info(root, &params.team_name)?;

    let session_name = format!("octeam-{}", params.team_name);
    if !multiplexer.has_session(&session_name).await.map_err(to_coord_error)? {
        multiplexer
            .new_session(&session_name, std::path::Path::new(&params.project_path))
            .await
            .map_err(to_coord_error)?;
    }

    let server_info = server::ensure_running(root, now.clone(), server_controller, &params.project_path).await?;

    let agent_id = AgentId::new(id_gen.next());

    let lru_inactive = octeam_engine::agents::list_agents(root, Some(&params.team_name))
        .unwrap_or_default()
        .into_iter()
        .filter(|a| !a.is_active())
        .min_by(|a, b| a.heartbeat_ts.cmp(&b.heartbeat_ts))
        .map(|a| a.id);

    let color = octeam_engine::color::allocate_color(root, now.clone(), &agent_id, lru_inactive.as_ref())?;

    let pane_id = match multiplexer.split_window(&session_name, std::path::Path::new(&params.project_path)).await {
        Ok(pane) => pane,
        Err(err) => {
            let _ = octeam_engine::color::release_color(root, &agent_id);
            return Err(to_coord_error(err));
        }
    };

    let cleanup_pane_and_color = |agent_id: &AgentId, pane_id: &str| {
        let _ = octeam_engine::color::release_color(root, agent_id);
        let pane_id = pane_id.to_string();
        let multiplexer = multiplexer.clone();
        tokio::spawn(async move {
            let _ = multiplexer.kill_pane(&pane_id).await;
        });
    };

    let title = format!("teams::{}::agent::{}::role::{}", params.team_name, agent_id, params.role);
    let session_id = match sdk_client
        .create_session(&server_info.hostname, server_info.port, &title, &params.project_path)
        .await
    {
        Ok(id) => id,
        Err(err) => {
            cleanup_pane_and_color(&agent_id, &pane_id);
            return Err(to_coord_runtime_error(err));
        }
    };

    let attach_cmd = format!("opencode attach --session {session_id} http://{}:{}", server_info.hostname, server_info.port);
    if let Err(err) = multiplexer.send_keys(&pane_id, &attach_cmd).await {
        cleanup_pane_and_color(&agent_id, &pane_id);
        return Err(to_coord_error(err));
    }
    let _ = multiplexer.select_pane_title(&pane_id, &params.name).await;
    let _ = multiplexer.set_pane_option(&pane_id, "@opencode_session_id", &session_id).await;
    let _ = multiplexer.select_layout(&session_name, "tiled").await;

    let agent = AgentRecord {
        id: agent_id.clone(),
        name: params.name.clone(),
        team_name: params.team_name.clone(),
        role: params.role,
        model: params.model.clone(),
        provider_id: params.provider_id.clone(),
        session_id,
        pane_id: Some(pane_id.clone()),
        server_port: server_info.port,
        cwd: params.project_path.clone(),
        initial_prompt: params.initial_prompt.clone(),
        color,
        status: AgentStatus::Spawning,
        created_at: now.clone(),
        heartbeat_ts: now.clone(),
        updated_at: None,
        terminated_at: None,
        consecutive_misses: 0,
        last_error: None,
        session_rotation_count: 0,
    };
    let agent = match octeam_engine::agents::register_agent(root, agent) {
        Ok(agent) => agent,
        Err(err) => {
            cleanup_pane_and_color(&agent_id, &pane_id);
            return Err(err);
        }
    };

    octeam_engine::teams::join_team(
        root,
        now.clone(),
        &params.team_name,
        agent_id.clone(),
        params.name.clone(),
        params.role.to_string(),
    )?;
    server::adjust_active_sessions(root, &params.project_path, 1)?;

    // Registration succeeded: from here a failure leaves the agent in
    // `spawning` for the leader to recover manually (spec.md §4.4).
    if let Some(prompt) = &params.initial_prompt {
        let delivered =
            send_prompt_reliable(sdk_client, &server_info.hostname, server_info.port, &agent.session_id, prompt).await;
        if !delivered {
            tracing::warn!(agent_id = %agent_id, "initial prompt delivery exhausted retries; leaving agent in spawning");
            return Ok(agent);
        }
    }

    let agent = octeam_engine::agents::transition_status(root, clock.now_iso8601(), &agent_id, AgentStatus::Active, false)?;

    let _ = team;
    bus.emit(&Event::new(id_gen.next(), EventType::AgentIdle, &params.team_name, clock.now_iso8601()).with_payload("agent_id", agent_id.as_str()));

    Ok(agent)
}

/// *killAgent* (spec.md §4.4 Shutdown/kill). `forced=false` negotiates the
/// `shutdown_request`/`shutdown_approved` handshake first; `forced=true`
/// skips straight to teardown. The leader cannot be targeted.
#[allow(clippy::too_many_arguments)]
pub async fn kill_agent(
    root: &StorageRoot,
    id_gen: &dyn IdGen,
    clock: &dyn Clock,
    bus: &EventBus,
    multiplexer: &Arc<dyn MultiplexerAdapter>,
    server_controller: &Arc<dyn ServerController>,
    caller: &AgentId,
    target: &AgentId,
    forced: bool,
) -> CoordResult<()> {
    let agent = octeam_engine::agents::get_agent(root, target)?;
    let team = octeam_engine::teams::get_team_info(root, &agent.team_name)?;

    if &team.leader == target {
        return Err(CoordError::precondition_failed("cannot kill the team leader through kill-agent"));
    }
    if agent.status == AgentStatus::Terminated {
        return Err(CoordError::precondition_failed(format!("agent {target} is already terminated")));
    }

    if !forced {
        if &team.leader != caller {
            return Err(CoordError::permission("only the leader may request a graceful shutdown"));
        }
        if !agent.is_active() {
            return Err(CoordError::precondition_failed(format!("agent {target} is not active")));
        }

        octeam_engine::messaging::request_shutdown(root, clock.now_iso8601(), &agent.team_name, target)?;
        octeam_engine::agents::transition_status(root, clock.now_iso8601(), target, AgentStatus::ShuttingDown, false)?;

        let deadline = std::time::Instant::now() + Duration::from_secs(30);
        loop {
            if octeam_engine::messaging::should_shutdown(root, &agent.team_name)? {
                break;
            }
            let approvals_include_target = octeam_engine::teams::get_team_info(root, &agent.team_name)?
                .shutdown_approvals
                .contains(target);
            if approvals_include_target {
                break;
            }
            if std::time::Instant::now() >= deadline {
                tracing::warn!(agent_id = %target, "graceful shutdown negotiation timed out, proceeding with teardown");
                break;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }

    tear_down_agent(root, id_gen, clock, bus, multiplexer, server_controller, &agent, &team.name).await
}

#[allow(clippy::too_many_arguments)]
async fn tear_down_agent(
    root: &StorageRoot,
    id_gen: &dyn IdGen,
    clock: &dyn Clock,
    bus: &EventBus,
    multiplexer: &Arc<dyn MultiplexerAdapter>,
    server_controller: &Arc<dyn ServerController>,
    agent: &AgentRecord,
    team_name: &str,
) -> CoordResult<()> {
    let _ = octeam_engine::tasks::reassign_agent_tasks(root, team_name, &agent.id);

    if let Some(pane_id) = &agent.pane_id {
        if let Err(err) = multiplexer.kill_pane(pane_id).await {
            tracing::warn!(agent_id = %agent.id, error = %err, "pane cleanup failed, continuing teardown");
        }
    }
    let _ = octeam_engine::color::release_color(root, &agent.id);

    octeam_engine::agents::transition_status(root, clock.now_iso8601(), &agent.id, AgentStatus::Terminated, true)?;

    let mut team = octeam_engine::teams::get_team_info(root, team_name)?;
    team.members.retain(|m| m.agent_id != agent.id);
    octeam_storage::write_atomic(&root.team_config(team_name), &team).map_err(CoordError::from)?;

    // Reap the backing server once every agent using it has gone
    // (spec.md §4.4: "decrement server activeSessions, reap server if it
    // hits zero").
    let remaining = server::adjust_active_sessions(root, &agent.cwd, -1)?;
    if remaining == 0 {
        server::stop(root, server_controller, &agent.cwd).await?;
    }

    bus.emit(&Event::new(
        id_gen.next(),
        EventType::AgentTerminated,
        team_name,
        clock.now_iso8601(),
    )
    .with_payload("agent_id", agent.id.as_str()));

    Ok(())
}

/// *Error recovery* (spec.md §4.4): on a context-limit `session.error`,
/// capture recent pane output, open a fresh session, and re-attach with a
/// continuation prompt built from the captured context.
pub async fn recover_from_context_limit(
    root: &StorageRoot,
    clock: &dyn Clock,
    multiplexer: &Arc<dyn MultiplexerAdapter>,
    sdk_client: &Arc<dyn SdkClient>,
    hostname: &str,
    agent_id: &AgentId,
) -> CoordResult<AgentRecord> {
    let agent = octeam_engine::agents::get_agent(root, agent_id)?;
    let captured = match &agent.pane_id {
        Some(pane_id) => multiplexer.capture_pane(pane_id, 500).await.unwrap_or_default(),
        None => String::new(),
    };

    let title = format!("teams::{}::agent::{}::role::{}", agent.team_name, agent.id, agent.role);
    let new_session_id = sdk_client
        .create_session(hostname, agent.server_port, &title, &agent.cwd)
        .await
        .map_err(to_coord_runtime_error)?;

    let updated = octeam_engine::agents::rotate_session(root, clock.now_iso8601(), agent_id, new_session_id.clone())?;

    if let Some(pane_id) = &agent.pane_id {
        let attach_cmd = format!("opencode attach --session {new_session_id} http://{hostname}:{}", agent.server_port);
        let _ = multiplexer.send_keys(pane_id, &attach_cmd).await;
    }

    let continuation = format!("Continuing from recovered context:\n{captured}");
    send_prompt_reliable(sdk_client, hostname, agent.server_port, &new_session_id, &continuation).await;

    Ok(updated)
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
