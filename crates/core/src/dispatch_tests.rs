// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn event_type_wire_strings_match_taxonomy() {
    assert_eq!(EventType::TaskCreated.as_str(), "task.created");
    assert_eq!(EventType::TaskUnblocked.as_str(), "task.unblocked");
    assert_eq!(EventType::SessionIdle.as_str(), "session.idle");
}

#[test]
fn rule_defaults_to_enabled() {
    let json = r#"{
        "id": "r1",
        "event_type": "task_unblocked",
        "action": {"kind": "assign_task"},
        "priority": 0
    }"#;
    let rule: DispatchRule = serde_json::from_str(json).unwrap();
    assert!(rule.enabled);
    assert!(rule.condition.is_none());
}

#[test]
fn simple_match_condition_round_trips() {
    let cond = Condition::SimpleMatch {
        field: "task.priority".into(),
        operator: ConditionOperator::Eq,
        value: serde_json::json!("high"),
    };
    let json = serde_json::to_string(&cond).unwrap();
    let back: Condition = serde_json::from_str(&json).unwrap();
    assert_eq!(cond, back);
}

#[test]
fn resource_count_condition_round_trips() {
    let cond = Condition::ResourceCount {
        resource: ResourceKind::UnblockedTasks,
        operator: ConditionOperator::Gte,
        value: 3.0,
    };
    let json = serde_json::to_string(&cond).unwrap();
    let back: Condition = serde_json::from_str(&json).unwrap();
    assert_eq!(cond, back);
}

#[test]
fn action_variants_round_trip() {
    for action in [
        Action::AssignTask,
        Action::NotifyLeader { message: "go".into() },
        Action::Log { message: "x".into() },
    ] {
        let json = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }
}
