// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events emitted onto the in-process event bus (spec.md §4.5).

use crate::dispatch::EventType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event carries a free-form payload map (`taskId`, `agentId`, etc.) so
/// dispatch conditions can address it via a dotted field path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub event_type: EventType,
    pub team_name: String,
    pub timestamp: String,
    #[serde(default)]
    pub payload: HashMap<String, serde_json::Value>,
}

impl Event {
    pub fn new(id: impl Into<String>, event_type: EventType, team_name: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            event_type,
            team_name: team_name.into(),
            timestamp: timestamp.into(),
            payload: HashMap::new(),
        }
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Resolve a dotted path (`"task.priority"`) into the payload. Only one
    /// level of nesting is supported today (the payload is a flat map of
    /// json values, some of which may themselves be objects).
    pub fn get_path(&self, path: &str) -> Option<&serde_json::Value> {
        let mut parts = path.splitn(2, '.');
        let head = parts.next()?;
        let rest = parts.next();
        let value = self.payload.get(head)?;
        match rest {
            None => Some(value),
            Some(rest) => rest.split('.').try_fold(value, |v, key| v.get(key)),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
