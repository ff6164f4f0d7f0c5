// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbox message types (spec.md §3.1 Message, §4.3 Messaging & Inboxes).

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

/// The literal recipient value used for broadcast messages.
pub const BROADCAST: &str = "broadcast";

/// Message type. Backward-compatible: messages persisted before this field
/// existed deserialize with `#[serde(default)]`, which resolves to `Plain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Plain,
    Idle,
    TaskAssignment,
    ShutdownRequest,
    ShutdownApproved,
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Plain
    }
}

/// A single message appended to an agent's inbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub from: AgentId,
    /// An agent id, or the literal string `"broadcast"`.
    pub to: String,
    pub body: String,
    #[serde(default, rename = "type")]
    pub msg_type: MessageType,
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
    /// Populated for broadcast messages: every recipient's agent id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<AgentId>>,
}

impl Message {
    pub fn new(from: AgentId, to: impl Into<String>, body: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            from,
            to: to.into(),
            body: body.into(),
            msg_type: MessageType::Plain,
            timestamp: timestamp.into(),
            read: false,
            recipients: None,
        }
    }

    pub fn with_type(mut self, msg_type: MessageType) -> Self {
        self.msg_type = msg_type;
        self
    }

    pub fn with_recipients(mut self, recipients: Vec<AgentId>) -> Self {
        self.recipients = Some(recipients);
        self
    }
}

/// An agent's inbox: an ordered, append-only (except for the read-flag flip)
/// sequence of messages.
pub type Inbox = Vec<Message>;

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
