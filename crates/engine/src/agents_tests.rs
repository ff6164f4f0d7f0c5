// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_core::test_support::{sample_agent, FIXED_NOW};
use octeam_core::{AgentRole, HeartbeatSource};
use tempfile::tempdir;

fn root() -> (tempfile::TempDir, StorageRoot) {
    let dir = tempdir().unwrap();
    let root = StorageRoot::at(dir.path().to_path_buf());
    (dir, root)
}

#[test]
fn register_agent_rejects_duplicate_id() {
    let (_dir, root) = root();
    let agent = sample_agent("alpha", AgentRole::Worker);
    register_agent(&root, agent.clone()).unwrap();
    let err = register_agent(&root, agent).unwrap_err();
    assert_eq!(err.category(), "conflict");
}

#[test]
fn get_agent_round_trips_registration() {
    let (_dir, root) = root();
    let agent = sample_agent("alpha", AgentRole::Worker);
    register_agent(&root, agent.clone()).unwrap();
    let fetched = get_agent(&root, &agent.id).unwrap();
    assert_eq!(fetched.id, agent.id);
    assert_eq!(fetched.status, agent.status);
}

#[test]
fn list_agents_filters_by_team_and_skips_corrupt_files() {
    let (_dir, root) = root();
    let a = sample_agent("alpha", AgentRole::Worker);
    let mut b = sample_agent("beta", AgentRole::Worker);
    b.id = octeam_core::AgentId::new("agent-2");
    register_agent(&root, a.clone()).unwrap();
    register_agent(&root, b).unwrap();

    std::fs::write(root.agent_file("garbage"), b"not json").unwrap();

    let alpha_only = list_agents(&root, Some("alpha")).unwrap();
    assert_eq!(alpha_only.len(), 1);
    assert_eq!(alpha_only[0].id, a.id);

    let all = list_agents(&root, None).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn heartbeat_is_idempotent_and_resets_misses() {
    let (_dir, root) = root();
    let mut agent = sample_agent("alpha", AgentRole::Worker);
    agent.consecutive_misses = 3;
    register_agent(&root, agent.clone()).unwrap();

    for _ in 0..3 {
        heartbeat(&root, FIXED_NOW, &agent.id, HeartbeatSource::Explicit, None).unwrap();
    }
    let fetched = get_agent(&root, &agent.id).unwrap();
    assert_eq!(fetched.consecutive_misses, 0);
    assert_eq!(fetched.heartbeat_ts, FIXED_NOW);
}

#[test]
fn transition_status_rejects_invalid_moves() {
    let (_dir, root) = root();
    let agent = sample_agent("alpha", AgentRole::Worker);
    register_agent(&root, agent.clone()).unwrap();

    let err = transition_status(
        &root,
        FIXED_NOW,
        &agent.id,
        octeam_core::AgentStatus::Terminated,
        false,
    )
    .unwrap_err();
    assert_eq!(err.category(), "conflict");

    transition_status(&root, FIXED_NOW, &agent.id, octeam_core::AgentStatus::Active, false).unwrap();
    let fetched = get_agent(&root, &agent.id).unwrap();
    assert_eq!(fetched.status, octeam_core::AgentStatus::Active);
}

#[test]
fn record_missed_heartbeat_increments_counter() {
    let (_dir, root) = root();
    let agent = sample_agent("alpha", AgentRole::Worker);
    register_agent(&root, agent.clone()).unwrap();

    record_missed_heartbeat(&root, &agent.id).unwrap();
    let fetched = record_missed_heartbeat(&root, &agent.id).unwrap();
    assert_eq!(fetched.consecutive_misses, 2);
}

#[test]
fn rotate_session_bumps_count_and_swaps_id() {
    let (_dir, root) = root();
    let agent = sample_agent("alpha", AgentRole::Worker);
    register_agent(&root, agent.clone()).unwrap();

    let updated = rotate_session(&root, FIXED_NOW, &agent.id, "session-2").unwrap();
    assert_eq!(updated.session_id, "session-2");
    assert_eq!(updated.session_rotation_count, 1);
}

#[test]
fn delete_agent_removes_record() {
    let (_dir, root) = root();
    let agent = sample_agent("alpha", AgentRole::Worker);
    register_agent(&root, agent.clone()).unwrap();
    delete_agent(&root, &agent.id).unwrap();
    assert_eq!(get_agent(&root, &agent.id).unwrap_err().category(), "not_found");
}
