// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_core::test_support::{team_with_workers, FIXED_NOW};
use octeam_core::{AgentId, EventType, FakeClock, SequentialIdGen, TaskPriority, WorkflowConfig};
use octeam_storage::write_atomic;

fn root() -> (tempfile::TempDir, StorageRoot) {
    let dir = tempfile::tempdir().unwrap();
    let root = StorageRoot::at(dir.path().to_path_buf());
    (dir, root)
}

fn seed_team(root: &StorageRoot, worker_count: usize, workflow: WorkflowConfig) {
    let mut team = team_with_workers("alpha", worker_count);
    team.workflow = Some(workflow);
    write_atomic(&root.team_config("alpha"), &team).unwrap();
}

fn create_pending_task(root: &StorageRoot, id_gen: &SequentialIdGen, title: &str) {
    octeam_engine::tasks::create_task(
        root,
        id_gen,
        FIXED_NOW,
        "alpha",
        octeam_core::TaskInput { title: title.to_string(), description: None, priority: TaskPriority::Normal, dependencies: Vec::new() },
    )
    .unwrap();
}

fn completed_event() -> Event {
    Event::new("evt-1", EventType::TaskCompleted, "alpha", FIXED_NOW)
}

#[test]
fn disabled_workflow_never_suggests() {
    let (_dir, root) = root();
    seed_team(&root, 1, WorkflowConfig { enabled: false, ..WorkflowConfig::default() });
    let id_gen = SequentialIdGen::new("task");
    for i in 0..5 {
        create_pending_task(&root, &id_gen, &format!("task-{i}"));
    }

    let clock = FakeClock::default();
    handle_task_completed(&root, &clock, &completed_event()).unwrap();

    let leader_inbox = octeam_engine::messaging::read_messages(&root, "alpha", &AgentId::new("leader-1"), None).unwrap();
    assert!(leader_inbox.is_empty());
}

#[test]
fn backlog_over_threshold_notifies_leader_once_per_cooldown() {
    let (_dir, root) = root();
    seed_team(
        &root,
        1,
        WorkflowConfig { enabled: true, backlog_ratio_threshold: 2.0, min_unblocked_tasks: 3, cooldown_ms: 300_000, last_suggestion_at_ms: None },
    );
    let id_gen = SequentialIdGen::new("task");
    for i in 0..5 {
        create_pending_task(&root, &id_gen, &format!("task-{i}"));
    }

    let clock = FakeClock::default();
    handle_task_completed(&root, &clock, &completed_event()).unwrap();

    let leader_inbox = octeam_engine::messaging::read_messages(&root, "alpha", &AgentId::new("leader-1"), None).unwrap();
    assert_eq!(leader_inbox.len(), 1);
    assert!(leader_inbox[0].body.contains("unblocked task"));

    // Still within the cooldown: no second suggestion.
    clock.advance(1_000);
    handle_task_completed(&root, &clock, &completed_event()).unwrap();
    let leader_inbox = octeam_engine::messaging::read_messages(&root, "alpha", &AgentId::new("leader-1"), None).unwrap();
    assert!(leader_inbox.is_empty(), "cooldown should suppress the repeat suggestion");

    // Past the cooldown, a fresh completion can suggest again.
    clock.advance(300_000);
    handle_task_completed(&root, &clock, &completed_event()).unwrap();
    let leader_inbox = octeam_engine::messaging::read_messages(&root, "alpha", &AgentId::new("leader-1"), None).unwrap();
    assert_eq!(leader_inbox.len(), 1);
}

#[test]
fn backlog_below_minimum_does_not_notify() {
    let (_dir, root) = root();
    seed_team(&root, 1, WorkflowConfig { enabled: true, min_unblocked_tasks: 10, ..WorkflowConfig::default() });
    let id_gen = SequentialIdGen::new("task");
    create_pending_task(&root, &id_gen, "only-task");

    let clock = FakeClock::default();
    handle_task_completed(&root, &clock, &completed_event()).unwrap();

    let leader_inbox = octeam_engine::messaging::read_messages(&root, "alpha", &AgentId::new("leader-1"), None).unwrap();
    assert!(leader_inbox.is_empty());
}
