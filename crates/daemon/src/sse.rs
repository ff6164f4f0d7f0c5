// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AI-agent-runtime SSE consumer (spec.md §4.4): maps the server-sent event
//! stream (`session.idle`, `session.updated`, `tool.execute.after`,
//! `session.error`) onto agent heartbeats, status transitions, and
//! context-limit error recovery. One stream per backing server, shared by
//! every agent session that server hosts.

use std::sync::Arc;

use octeam_adapters::{MultiplexerAdapter, SdkClient, SdkEvent};
use octeam_core::{AgentRecord, AgentStatus, Clock, HeartbeatSource};
use octeam_storage::StorageRoot;

fn find_agent_by_session(root: &StorageRoot, session_id: &str) -> Option<AgentRecord> {
    octeam_engine::agents::list_agents(root, None)
        .ok()?
        .into_iter()
        .find(|a| a.session_id == session_id)
}

fn is_context_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["context limit", "context length", "context window", "conversation too long"]
        .iter()
        .any(|p| lower.contains(p))
}

/// Apply one SSE event's effect on agent state. An event whose session id
/// matches no known agent (it arrived after the agent already tore down)
/// is silently ignored.
pub async fn handle_event(
    root: &StorageRoot,
    clock: &dyn Clock,
    multiplexer: &Arc<dyn MultiplexerAdapter>,
    sdk_client: &Arc<dyn SdkClient>,
    hostname: &str,
    event: &SdkEvent,
) {
    let Some(session_id) = &event.session_id else { return };
    let Some(agent) = find_agent_by_session(root, session_id) else { return };

    match event.event_type.as_str() {
        "session.idle" => {
            let _ = octeam_engine::agents::heartbeat(
                root,
                clock.now_iso8601(),
                &agent.id,
                HeartbeatSource::SdkSessionIdle,
                Some(AgentStatus::Idle),
            );
        }
        "session.updated" => {
            let _ = octeam_engine::agents::heartbeat(
                root,
                clock.now_iso8601(),
                &agent.id,
                HeartbeatSource::SdkSessionUpdated,
                Some(AgentStatus::Active),
            );
        }
        "tool.execute.after" => {
            let _ = octeam_engine::agents::heartbeat(
                root,
                clock.now_iso8601(),
                &agent.id,
                HeartbeatSource::SdkToolExecuteAfter,
                Some(AgentStatus::Active),
            );
        }
        "session.error" => {
            let is_context_limit = event.message.as_deref().map(is_context_limit_message).unwrap_or(false);
            if is_context_limit {
                if let Err(err) =
                    crate::agents::recover_from_context_limit(root, clock, multiplexer, sdk_client, hostname, &agent.id).await
                {
                    tracing::warn!(agent = %agent.id, error = %err, "context-limit recovery failed");
                }
            } else if let Some(message) = &event.message {
                let _ = octeam_engine::agents::set_last_error(root, clock.now_iso8601(), &agent.id, message.clone());
            }
        }
        other => tracing::debug!(event_type = other, "unhandled SSE event type"),
    }
}

/// Drain one server's SSE stream until it closes (the backing process
/// exited or was reaped). Spawned once per server by the coordinator; many
/// agents across many teams can share a single stream.
pub async fn run(
    root: Arc<StorageRoot>,
    clock: Arc<dyn Clock>,
    multiplexer: Arc<dyn MultiplexerAdapter>,
    sdk_client: Arc<dyn SdkClient>,
    hostname: String,
    port: u16,
) {
    let mut events = match sdk_client.subscribe_events(&hostname, port).await {
        Ok(rx) => rx,
        Err(err) => {
            tracing::warn!(error = %err, "failed to subscribe to SSE stream");
            return;
        }
    };
    while let Some(event) = events.recv().await {
        handle_event(&root, clock.as_ref(), &multiplexer, &sdk_client, &hostname, &event).await;
    }
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
