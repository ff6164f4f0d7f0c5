// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::AgentId;

#[test]
fn new_message_defaults_to_plain_and_unread() {
    let msg = Message::new(AgentId::new("a"), "b", "hi", "now");
    assert_eq!(msg.msg_type, MessageType::Plain);
    assert!(!msg.read);
    assert!(msg.recipients.is_none());
}

#[test]
fn missing_type_field_parses_as_plain() {
    let json = r#"{"from":"a","to":"b","body":"hi","timestamp":"now","read":false}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.msg_type, MessageType::Plain);
}

#[test]
fn typed_message_round_trips() {
    let msg = Message::new(AgentId::new("a"), "b", "please stop", "now")
        .with_type(MessageType::ShutdownRequest);
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"type\":\"shutdown_request\""));
    let back: Message = serde_json::from_str(&json).unwrap();
    assert_eq!(back.msg_type, MessageType::ShutdownRequest);
}

#[test]
fn broadcast_message_carries_recipients() {
    let msg = Message::new(AgentId::new("leader"), BROADCAST, "standup", "now")
        .with_recipients(vec![AgentId::new("w1"), AgentId::new("w2")]);
    assert_eq!(msg.to, "broadcast");
    assert_eq!(msg.recipients.unwrap().len(), 2);
}
