// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_adapters::{FakeMultiplexer, FakeRuntime};
use octeam_core::test_support::FIXED_NOW;
use octeam_core::{AgentId, AgentRole, FakeClock};

fn root() -> (tempfile::TempDir, StorageRoot) {
    let dir = tempfile::tempdir().unwrap();
    let root = StorageRoot::at(dir.path().to_path_buf());
    (dir, root)
}

fn harness() -> (Arc<dyn MultiplexerAdapter>, FakeRuntime, Arc<dyn SdkClient>) {
    let mux: Arc<dyn MultiplexerAdapter> = Arc::new(FakeMultiplexer::new());
    let runtime = FakeRuntime::new();
    let sdk_client: Arc<dyn SdkClient> = Arc::new(runtime.clone());
    (mux, runtime, sdk_client)
}

#[tokio::test]
async fn session_idle_event_heartbeats_and_transitions_to_idle() {
    let (_dir, root) = root();
    let clock = FakeClock::default();
    let (mux, _runtime, sdk_client) = harness();

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    let mut agent = octeam_core::test_support::sample_agent("alpha", AgentRole::Worker);
    agent.status = octeam_core::AgentStatus::Active;
    agent.session_id = "ses_1".to_string();
    octeam_engine::agents::register_agent(&root, agent.clone()).unwrap();

    clock.advance(5_000);
    let event = SdkEvent { event_type: "session.idle".to_string(), session_id: Some("ses_1".to_string()), message: None };
    handle_event(&root, &clock, &mux, &sdk_client, "127.0.0.1", &event).await;

    let persisted = octeam_engine::agents::get_agent(&root, &agent.id).unwrap();
    assert_eq!(persisted.status, octeam_core::AgentStatus::Idle);
    assert_eq!(persisted.heartbeat_ts, clock.now_iso8601());
}

#[tokio::test]
async fn unknown_session_id_is_ignored() {
    let (_dir, root) = root();
    let clock = FakeClock::default();
    let (mux, _runtime, sdk_client) = harness();

    let event = SdkEvent { event_type: "session.idle".to_string(), session_id: Some("ghost".to_string()), message: None };
    handle_event(&root, &clock, &mux, &sdk_client, "127.0.0.1", &event).await;
}

#[tokio::test]
async fn session_error_without_context_limit_just_records_last_error() {
    let (_dir, root) = root();
    let clock = FakeClock::default();
    let (mux, _runtime, sdk_client) = harness();

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    let mut agent = octeam_core::test_support::sample_agent("alpha", AgentRole::Worker);
    agent.status = octeam_core::AgentStatus::Active;
    agent.session_id = "ses_1".to_string();
    octeam_engine::agents::register_agent(&root, agent.clone()).unwrap();

    let event = SdkEvent {
        event_type: "session.error".to_string(),
        session_id: Some("ses_1".to_string()),
        message: Some("rate limit exceeded".to_string()),
    };
    handle_event(&root, &clock, &mux, &sdk_client, "127.0.0.1", &event).await;

    let persisted = octeam_engine::agents::get_agent(&root, &agent.id).unwrap();
    assert_eq!(persisted.last_error.as_deref(), Some("rate limit exceeded"));
    assert_eq!(persisted.session_rotation_count, 0);
}

#[tokio::test]
async fn context_limit_error_triggers_session_recovery() {
    let (_dir, root) = root();
    let clock = FakeClock::default();
    let (mux, runtime, sdk_client) = harness();

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    let mut agent = octeam_core::test_support::sample_agent("alpha", AgentRole::Worker);
    agent.status = octeam_core::AgentStatus::Active;
    agent.session_id = "ses_1".to_string();
    octeam_engine::agents::register_agent(&root, agent.clone()).unwrap();

    let event = SdkEvent {
        event_type: "session.error".to_string(),
        session_id: Some("ses_1".to_string()),
        message: Some("conversation too long, context window exceeded".to_string()),
    };
    handle_event(&root, &clock, &mux, &sdk_client, "127.0.0.1", &event).await;

    let persisted = octeam_engine::agents::get_agent(&root, &agent.id).unwrap();
    assert_eq!(persisted.session_rotation_count, 1);
    assert_ne!(persisted.session_id, "ses_1");
    assert!(runtime.calls().iter().any(|c| matches!(c, octeam_adapters::RuntimeCall::CreateSession { .. })));
}
