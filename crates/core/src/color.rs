// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Visual color assignment for agents (spec.md §3.1 ColorPool).

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed palette of ten hex colors assigned round-robin to agents.
pub const PALETTE: [&str; 10] = [
    "#e06c75", "#98c379", "#e5c07b", "#61afef", "#c678dd", "#56b6c2", "#d19a66", "#be5046",
    "#528bff", "#a8a8a8",
];

/// `color-pool.json`: which agent currently holds which palette color.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorPool {
    #[serde(default)]
    pub assignments: HashMap<AgentId, String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl ColorPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn colors_in_use(&self) -> std::collections::HashSet<&str> {
        self.assignments.values().map(|s| s.as_str()).collect()
    }

    /// Allocate a color for `agent_id`: first unused palette slot; if the
    /// palette is exhausted, fall back to the given inactive agent's color
    /// (least-recently-used), or a deterministic hash-derived color.
    pub fn allocate(
        &mut self,
        agent_id: AgentId,
        timestamp: impl Into<String>,
        lru_inactive: Option<&AgentId>,
    ) -> String {
        let in_use = self.colors_in_use();
        let color = PALETTE
            .iter()
            .find(|c| !in_use.contains(*c))
            .map(|c| c.to_string())
            .or_else(|| {
                lru_inactive
                    .and_then(|id| self.assignments.get(id))
                    .cloned()
            })
            .unwrap_or_else(|| hash_derived_color(agent_id.as_str()));

        self.assignments.insert(agent_id, color.clone());
        self.last_updated = Some(timestamp.into());
        color
    }

    pub fn release(&mut self, agent_id: &AgentId) {
        self.assignments.remove(agent_id);
    }
}

/// Deterministic fallback color when the palette is exhausted and no LRU
/// inactive agent is available to reclaim a color from.
fn hash_derived_color(agent_id: &str) -> String {
    let mut hash: u32 = 2166136261;
    for byte in agent_id.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(16777619);
    }
    format!("#{:06x}", hash & 0x00ff_ffff)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
