// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_adapters::FakeRuntime;
use octeam_core::test_support::FIXED_NOW;
use tempfile::tempdir;

fn root() -> (tempfile::TempDir, StorageRoot) {
    let dir = tempdir().unwrap();
    let root = StorageRoot::at(dir.path().to_path_buf());
    (dir, root)
}

#[test]
fn project_hash_is_deterministic_hex_md5() {
    let a = project_hash("/home/user/project");
    let b = project_hash("/home/user/project");
    let c = project_hash("/home/user/other");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn ensure_running_launches_and_persists_server_info() {
    let (_dir, root) = root();
    let fake = FakeRuntime::new();
    let controller: Arc<dyn ServerController> = Arc::new(fake.clone());

    let info = ensure_running(&root, FIXED_NOW, &controller, "/workspace/demo").await.unwrap();
    assert!(info.is_running);
    assert!((28000..29000).contains(&info.port));

    let calls = fake.calls();
    assert!(calls.iter().any(|c| matches!(c, octeam_adapters::RuntimeCall::Spawn { .. })));
}

#[tokio::test]
async fn ensure_running_reuses_a_healthy_existing_server() {
    let (_dir, root) = root();
    let fake = FakeRuntime::new();
    let controller: Arc<dyn ServerController> = Arc::new(fake.clone());

    let first = ensure_running(&root, FIXED_NOW, &controller, "/workspace/demo").await.unwrap();
    let second = ensure_running(&root, FIXED_NOW, &controller, "/workspace/demo").await.unwrap();

    assert_eq!(first.pid, second.pid);
    let spawn_calls = fake
        .calls()
        .into_iter()
        .filter(|c| matches!(c, octeam_adapters::RuntimeCall::Spawn { .. }))
        .count();
    assert_eq!(spawn_calls, 1);
}

#[tokio::test]
async fn ensure_running_relaunches_when_existing_pid_died() {
    let (_dir, root) = root();
    let fake = FakeRuntime::new();
    let controller: Arc<dyn ServerController> = Arc::new(fake.clone());

    let first = ensure_running(&root, FIXED_NOW, &controller, "/workspace/demo").await.unwrap();
    fake.kill_externally(first.pid);

    let second = ensure_running(&root, FIXED_NOW, &controller, "/workspace/demo").await.unwrap();
    assert_ne!(first.pid, second.pid);
}

#[tokio::test]
async fn stop_marks_server_not_running() {
    let (_dir, root) = root();
    let fake = FakeRuntime::new();
    let controller: Arc<dyn ServerController> = Arc::new(fake.clone());

    ensure_running(&root, FIXED_NOW, &controller, "/workspace/demo").await.unwrap();
    stop(&root, &controller, "/workspace/demo").await.unwrap();

    let hash = project_hash("/workspace/demo");
    let info: ServerInfo = octeam_storage::read_validated(&root.server_file(&hash)).unwrap();
    assert!(!info.is_running);
}

#[test]
fn adjust_active_sessions_saturates_at_zero() {
    let (_dir, root) = root();
    let hash = project_hash("/workspace/demo");
    let info = ServerInfo::new("/workspace/demo", hash, 42, 28123, FIXED_NOW);
    write_server_info(&root, &project_hash("/workspace/demo"), &info).unwrap();

    let after_decrement = adjust_active_sessions(&root, "/workspace/demo", -5).unwrap();
    assert_eq!(after_decrement, 0);

    let after_increment = adjust_active_sessions(&root, "/workspace/demo", 3).unwrap();
    assert_eq!(after_increment, 3);
}
