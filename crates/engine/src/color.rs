// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Color pool persistence (spec.md §3.1 ColorPool, §5 "the color pool is a
//! single file under its own lock"). Allocation picks the least-recently-used
//! inactive agent's color once the ten-color palette is exhausted, which
//! needs the agent roster — callers pass it in rather than this module
//! reaching into `octeam-engine::agents` itself, keeping the two
//! independently testable.

use octeam_core::{AgentId, CoordError, CoordResult, ColorPool};
use octeam_storage::{locked_upsert, StorageRoot};

/// Allocate a color for `agent_id`. `lru_inactive` is the caller-supplied
/// least-recently-used inactive agent to reclaim from once the palette is
/// exhausted (spec.md §3.1 ColorPool fallback order).
pub fn allocate_color(
    root: &StorageRoot,
    now: impl Into<String>,
    agent_id: &AgentId,
    lru_inactive: Option<&AgentId>,
) -> CoordResult<String> {
    let now = now.into();
    let agent_id = agent_id.clone();
    let lru_inactive = lru_inactive.cloned();

    locked_upsert(
        &root.color_pool_lock(),
        &root.color_pool_file(),
        ColorPool::new,
        move |mut pool: ColorPool| {
            let color = pool.allocate(agent_id, now, lru_inactive.as_ref());
            Ok((pool, color))
        },
    )
    .map_err(CoordError::from)
}

/// Release `agent_id`'s color back to the pool (agent termination cleanup).
pub fn release_color(root: &StorageRoot, agent_id: &AgentId) -> CoordResult<()> {
    let agent_id = agent_id.clone();
    locked_upsert(
        &root.color_pool_lock(),
        &root.color_pool_file(),
        ColorPool::new,
        move |mut pool: ColorPool| {
            pool.release(&agent_id);
            Ok((pool, ()))
        },
    )
    .map_err(CoordError::from)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
