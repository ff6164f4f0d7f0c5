// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_core::test_support::FIXED_NOW;
use tempfile::tempdir;

fn root() -> (tempfile::TempDir, StorageRoot) {
    let dir = tempdir().unwrap();
    let root = StorageRoot::at(dir.path().to_path_buf());
    (dir, root)
}

#[test]
fn spawn_team_rejects_duplicate_name() {
    let (_dir, root) = root();
    spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    let err = spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-2")).unwrap_err();
    assert_eq!(err.category(), "conflict");
}

#[test]
fn leader_is_a_member_from_creation() {
    let (_dir, root) = root();
    let leader = AgentId::new("leader-1");
    let team = spawn_team(&root, FIXED_NOW, "alpha", leader.clone()).unwrap();
    assert!(team.is_member(&leader));
}

#[test]
fn join_team_rejects_duplicate_member() {
    let (_dir, root) = root();
    let leader = AgentId::new("leader-1");
    spawn_team(&root, FIXED_NOW, "alpha", leader.clone()).unwrap();
    join_team(&root, FIXED_NOW, "alpha", AgentId::new("worker-1"), "worker-1", "worker").unwrap();
    let err = join_team(&root, FIXED_NOW, "alpha", AgentId::new("worker-1"), "worker-1", "worker")
        .unwrap_err();
    assert_eq!(err.category(), "conflict");
}

#[test]
fn discover_teams_lists_all_spawned_teams() {
    let (_dir, root) = root();
    spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    spawn_team(&root, FIXED_NOW, "beta", AgentId::new("leader-2")).unwrap();

    let mut names: Vec<_> = discover_teams(&root).unwrap().into_iter().map(|t| t.name).collect();
    names.sort();
    assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);
}

#[test]
fn get_team_info_returns_not_found_for_missing_team() {
    let (_dir, root) = root();
    let err = get_team_info(&root, "ghost").unwrap_err();
    assert_eq!(err.category(), "not_found");
}

#[test]
fn delete_team_removes_config_and_tasks() {
    let (_dir, root) = root();
    spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    std::fs::create_dir_all(root.tasks_dir("alpha")).unwrap();

    delete_team(&root, "alpha").unwrap();

    assert!(!root.team_config("alpha").exists());
    assert!(!root.tasks_dir("alpha").exists());
}

#[test]
fn delete_team_deletes_unconditionally_even_with_members() {
    let (_dir, root) = root();
    spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    join_team(&root, FIXED_NOW, "alpha", AgentId::new("worker-1"), "worker-1", "worker").unwrap();

    delete_team(&root, "alpha").unwrap();
    assert!(!root.team_dir("alpha").exists());
}
