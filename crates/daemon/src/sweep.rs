// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stale-agent sweep (spec.md §4.4): every [`SWEEP_INTERVAL`], any active
//! agent whose heartbeat is older than [`STALE_THRESHOLD`] accrues a missed
//! heartbeat; [`MISS_LIMIT`] consecutive misses marks it `inactive`,
//! reassigns its in-progress tasks, and notifies the team leader.

use std::sync::Arc;
use std::time::Duration;

use octeam_core::{epoch_ms_from_iso8601, AgentId, AgentStatus, Clock, CoordResult, IdGen, MessageType};
use octeam_storage::StorageRoot;

/// How often [`sweep_once`] should be invoked by [`run`].
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(15);
/// A heartbeat older than this counts as missed.
pub const STALE_THRESHOLD: Duration = Duration::from_secs(60);
/// Consecutive misses before an agent is marked `inactive`.
pub const MISS_LIMIT: u32 = 2;

const SWEEP_AGENT_ID: &str = "stale-sweep";

/// One pass over every agent, regardless of team. Pure of any scheduling
/// concern so tests can call it directly against a [`FakeClock`].
pub fn sweep_once(root: &StorageRoot, clock: &dyn Clock) -> CoordResult<Vec<AgentId>> {
    let mut marked_inactive = Vec::new();
    let now_ms = clock.epoch_ms();

    for agent in octeam_engine::agents::list_agents(root, None)? {
        if !agent.is_active() {
            continue;
        }
        let heartbeat_ms = epoch_ms_from_iso8601(&agent.heartbeat_ts).unwrap_or(0);
        let age_ms = now_ms.saturating_sub(heartbeat_ms);
        if age_ms < STALE_THRESHOLD.as_millis() as u64 {
            continue;
        }

        let updated = octeam_engine::agents::record_missed_heartbeat(root, &agent.id)?;
        if updated.consecutive_misses < MISS_LIMIT {
            continue;
        }

        let now = clock.now_iso8601();
        octeam_engine::agents::transition_status(root, now.clone(), &agent.id, AgentStatus::Inactive, false)?;
        let reassigned = octeam_engine::tasks::reassign_agent_tasks(root, &agent.team_name, &agent.id)?;

        if let Ok(team) = octeam_engine::teams::get_team_info(root, &agent.team_name) {
            if team.leader != agent.id {
                let body = format!(
                    "agent {} went stale and was marked inactive ({} task(s) reassigned)",
                    agent.id,
                    reassigned.len()
                );
                let _ = octeam_engine::messaging::send_typed(
                    root,
                    now,
                    &agent.team_name,
                    &AgentId::new(SWEEP_AGENT_ID),
                    &team.leader,
                    body,
                    MessageType::Plain,
                );
            }
        }

        marked_inactive.push(agent.id);
    }

    Ok(marked_inactive)
}

/// Run [`sweep_once`] on a [`SWEEP_INTERVAL`] tick until the returned task
/// is dropped or aborted. `_id_gen` is accepted (not currently needed by the
/// sweep itself) to keep this function's signature symmetric with the other
/// background loops the [`crate::Coordinator`] spawns.
pub fn spawn(root: Arc<StorageRoot>, _id_gen: Arc<dyn IdGen>, clock: Arc<dyn Clock>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SWEEP_INTERVAL).await;
            if let Err(err) = sweep_once(&root, clock.as_ref()) {
                tracing::warn!(error = %err, "stale-agent sweep pass failed");
            }
        }
    })
}

#[cfg(test)]
#[path = "sweep_tests.rs"]
mod tests;
