// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_core::test_support::FIXED_NOW;
use octeam_core::{AgentId, AgentRole, FakeClock};

fn root() -> (tempfile::TempDir, StorageRoot) {
    let dir = tempfile::tempdir().unwrap();
    let root = StorageRoot::at(dir.path().to_path_buf());
    (dir, root)
}

#[test]
fn fresh_heartbeat_is_left_alone() {
    let (_dir, root) = root();
    let clock = FakeClock::default();

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    let mut agent = octeam_core::test_support::sample_agent("alpha", AgentRole::Worker);
    agent.status = octeam_core::AgentStatus::Active;
    agent.heartbeat_ts = clock.now_iso8601();
    octeam_engine::agents::register_agent(&root, agent.clone()).unwrap();

    let marked = sweep_once(&root, &clock).unwrap();
    assert!(marked.is_empty());

    let persisted = octeam_engine::agents::get_agent(&root, &agent.id).unwrap();
    assert_eq!(persisted.status, octeam_core::AgentStatus::Active);
    assert_eq!(persisted.consecutive_misses, 0);
}

#[test]
fn one_stale_pass_only_accrues_a_miss() {
    let (_dir, root) = root();
    let clock = FakeClock::default();

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    let mut agent = octeam_core::test_support::sample_agent("alpha", AgentRole::Worker);
    agent.status = octeam_core::AgentStatus::Active;
    octeam_engine::agents::register_agent(&root, agent.clone()).unwrap();

    clock.advance(STALE_THRESHOLD.as_millis() as u64 + 1_000);
    let marked = sweep_once(&root, &clock).unwrap();
    assert!(marked.is_empty());

    let persisted = octeam_engine::agents::get_agent(&root, &agent.id).unwrap();
    assert_eq!(persisted.status, octeam_core::AgentStatus::Active);
    assert_eq!(persisted.consecutive_misses, 1);
}

#[test]
fn two_consecutive_misses_marks_inactive_and_reassigns_tasks() {
    let (_dir, root) = root();
    let clock = FakeClock::default();
    let leader = AgentId::new("leader-1");

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", leader.clone()).unwrap();
    let leader_agent = octeam_core::AgentRecord {
        id: leader.clone(),
        status: octeam_core::AgentStatus::Active,
        ..octeam_core::test_support::sample_agent("alpha", AgentRole::Leader)
    };
    octeam_engine::agents::register_agent(&root, leader_agent).unwrap();

    let mut worker = octeam_core::test_support::sample_agent("alpha", AgentRole::Worker);
    worker.status = octeam_core::AgentStatus::Active;
    octeam_engine::agents::register_agent(&root, worker.clone()).unwrap();

    let id_gen = octeam_core::SequentialIdGen::new("task");
    let mutation = octeam_engine::tasks::create_task(
        &root,
        &id_gen,
        FIXED_NOW,
        "alpha",
        octeam_core::test_support::sample_task_input("fix the bug"),
    )
    .unwrap();
    octeam_engine::tasks::claim_task(&root, FIXED_NOW, "alpha", &mutation.task.id, &worker.id, Some(AgentRole::Worker)).unwrap();

    clock.advance(STALE_THRESHOLD.as_millis() as u64 + 1_000);
    sweep_once(&root, &clock).unwrap();
    clock.advance(STALE_THRESHOLD.as_millis() as u64 + 1_000);
    let marked = sweep_once(&root, &clock).unwrap();

    assert_eq!(marked, vec![worker.id.clone()]);

    let persisted = octeam_engine::agents::get_agent(&root, &worker.id).unwrap();
    assert_eq!(persisted.status, octeam_core::AgentStatus::Inactive);

    let task = octeam_engine::tasks::get_task(&root, "alpha", &mutation.task.id).unwrap();
    assert_eq!(task.status, octeam_core::TaskStatus::Pending);
    assert!(task.owner.is_none());

    let leader_inbox = octeam_engine::messaging::read_messages(&root, "alpha", &leader, None).unwrap();
    assert!(leader_inbox.iter().any(|m| m.body.contains("marked inactive")));
}
