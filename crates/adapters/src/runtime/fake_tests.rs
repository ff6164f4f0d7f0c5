// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[tokio::test]
async fn spawn_assigns_unique_pids() {
    let runtime = FakeRuntime::new();
    let first = runtime.spawn("127.0.0.1", 4001, Path::new("/tmp"), Path::new("/tmp/log")).await.unwrap();
    let second = runtime.spawn("127.0.0.1", 4002, Path::new("/tmp"), Path::new("/tmp/log")).await.unwrap();
    assert_ne!(first, second);
    assert!(runtime.is_alive(first).await);
    assert!(runtime.is_alive(second).await);
}

#[tokio::test]
async fn terminate_marks_pid_dead() {
    let runtime = FakeRuntime::new();
    let pid = runtime.spawn("127.0.0.1", 4001, Path::new("/tmp"), Path::new("/tmp/log")).await.unwrap();
    runtime.terminate(pid).await.unwrap();
    assert!(!runtime.is_alive(pid).await);
}

#[tokio::test]
async fn probe_ready_reflects_scripted_state() {
    let runtime = FakeRuntime::new();
    runtime.set_ready(false);
    assert!(!runtime.probe_ready("127.0.0.1", 4001).await);
    runtime.set_ready(true);
    assert!(runtime.probe_ready("127.0.0.1", 4001).await);
}

#[tokio::test]
async fn message_count_for_unknown_session_fails() {
    let runtime = FakeRuntime::new();
    let err = runtime.message_count("127.0.0.1", 4001, "ses_missing").await.unwrap_err();
    assert!(matches!(err, RuntimeError::SessionNotFound(_)));
}

#[tokio::test]
async fn send_prompt_increments_message_count() {
    let runtime = FakeRuntime::new();
    let session = runtime.create_session("127.0.0.1", 4001, "title", "/tmp").await.unwrap();
    runtime.send_prompt("127.0.0.1", 4001, &session, "hello", None, None).await.unwrap();
    runtime.send_prompt("127.0.0.1", 4001, &session, "again", None, None).await.unwrap();
    assert_eq!(runtime.message_count("127.0.0.1", 4001, &session).await.unwrap(), 2);
}

#[tokio::test]
async fn subscribe_events_replays_scripted_events_in_order() {
    let runtime = FakeRuntime::new();
    runtime.script_events(vec![
        SdkEvent { event_type: "session.idle".into(), session_id: Some("ses_1".into()), message: None },
        SdkEvent { event_type: "session.error".into(), session_id: Some("ses_1".into()), message: None },
    ]);

    let mut rx = runtime.subscribe_events("127.0.0.1", 4001).await.unwrap();
    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first.event_type, "session.idle");
    assert_eq!(second.event_type, "session.error");
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let runtime = FakeRuntime::new();
    let pid = runtime.spawn("127.0.0.1", 4001, Path::new("/tmp"), Path::new("/tmp/log")).await.unwrap();
    runtime.kill(pid).await.unwrap();

    let calls = runtime.calls();
    assert!(matches!(calls[0], RuntimeCall::Spawn { .. }));
    assert!(matches!(calls[1], RuntimeCall::Kill { .. }));
}
