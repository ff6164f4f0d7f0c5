// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_adapters::{FakeMultiplexer, FakeRuntime, MuxCall};
use octeam_core::test_support::FIXED_NOW;
use octeam_core::{AgentId, AgentRole, FakeClock, SequentialIdGen};

fn root() -> (tempfile::TempDir, StorageRoot) {
    let dir = tempfile::tempdir().unwrap();
    let root = StorageRoot::at(dir.path().to_path_buf());
    (dir, root)
}

fn harness() -> (FakeMultiplexer, Arc<dyn octeam_adapters::MultiplexerAdapter>, FakeRuntime, Arc<dyn octeam_adapters::ServerController>, Arc<dyn octeam_adapters::SdkClient>) {
    let mux = FakeMultiplexer::new();
    let mux_dyn: Arc<dyn octeam_adapters::MultiplexerAdapter> = Arc::new(mux.clone());
    let runtime = FakeRuntime::new();
    let server_controller: Arc<dyn octeam_adapters::ServerController> = Arc::new(runtime.clone());
    let sdk_client: Arc<dyn octeam_adapters::SdkClient> = Arc::new(runtime.clone());
    (mux, mux_dyn, runtime, server_controller, sdk_client)
}

fn params(team_name: &str) -> SpawnAgentParams {
    SpawnAgentParams {
        team_name: team_name.to_string(),
        name: "worker-0".to_string(),
        role: AgentRole::Worker,
        model: "claude-sonnet".to_string(),
        provider_id: None,
        project_path: "/workspace/demo".to_string(),
        initial_prompt: Some("start working".to_string()),
    }
}

#[tokio::test]
async fn spawn_agent_fails_fast_when_team_does_not_exist() {
    let (_dir, root) = root();
    let (_mux, mux_dyn, _runtime, server_controller, sdk_client) = harness();
    let id_gen = SequentialIdGen::new("agent");
    let clock = FakeClock::default();
    let bus = EventBus::new();

    let err = spawn_agent(&root, &id_gen, &clock, &bus, &mux_dyn, &server_controller, &sdk_client, params("ghost-team"))
        .await
        .unwrap_err();
    assert_eq!(err.category(), "not_found");
}

#[tokio::test]
async fn spawn_agent_registers_joins_and_activates_on_success() {
    let (_dir, root) = root();
    let (mux, mux_dyn, runtime, server_controller, sdk_client) = harness();
    let id_gen = SequentialIdGen::new("agent");
    let clock = FakeClock::default();
    let bus = EventBus::new();

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();

    let agent = spawn_agent(&root, &id_gen, &clock, &bus, &mux_dyn, &server_controller, &sdk_client, params("alpha"))
        .await
        .unwrap();

    assert_eq!(agent.status, octeam_core::AgentStatus::Active);
    assert!(agent.pane_id.is_some());
    assert!(!agent.color.is_empty());

    let team = octeam_engine::teams::get_team_info(&root, "alpha").unwrap();
    assert!(team.is_member(&agent.id));

    let persisted = octeam_engine::agents::get_agent(&root, &agent.id).unwrap();
    assert_eq!(persisted.status, octeam_core::AgentStatus::Active);

    assert!(mux.calls().iter().any(|c| matches!(c, MuxCall::SplitWindow { .. })));
    assert!(runtime
        .calls()
        .iter()
        .any(|c| matches!(c, octeam_adapters::RuntimeCall::CreateSession { .. })));
}

#[tokio::test]
async fn spawn_agent_omits_prompt_delivery_when_none_requested() {
    let (_dir, root) = root();
    let (_mux, mux_dyn, runtime, server_controller, sdk_client) = harness();
    let id_gen = SequentialIdGen::new("agent");
    let clock = FakeClock::default();
    let bus = EventBus::new();

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();

    let mut p = params("alpha");
    p.initial_prompt = None;
    let agent = spawn_agent(&root, &id_gen, &clock, &bus, &mux_dyn, &server_controller, &sdk_client, p)
        .await
        .unwrap();

    assert_eq!(agent.status, octeam_core::AgentStatus::Active);
    assert!(!runtime.calls().iter().any(|c| matches!(c, octeam_adapters::RuntimeCall::SendPrompt { .. })));
}

#[tokio::test]
async fn kill_agent_rejects_targeting_the_leader() {
    let (_dir, root) = root();
    let (_mux, mux_dyn, _runtime, server_controller, _sdk_client) = harness();
    let id_gen = SequentialIdGen::new("agent");
    let clock = FakeClock::default();
    let bus = EventBus::new();
    let leader = AgentId::new("leader-1");

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", leader.clone()).unwrap();
    let leader_agent = octeam_core::AgentRecord {
        id: leader.clone(),
        ..octeam_core::test_support::sample_agent("alpha", AgentRole::Leader)
    };
    octeam_engine::agents::register_agent(&root, leader_agent).unwrap();

    let err = kill_agent(&root, &id_gen, &clock, &bus, &mux_dyn, &server_controller, &leader, &leader, true)
        .await
        .unwrap_err();
    assert_eq!(err.category(), "precondition_failed");
}

#[tokio::test]
async fn kill_agent_forced_tears_down_and_removes_membership() {
    let (_dir, root) = root();
    let (mux, mux_dyn, runtime, server_controller, sdk_client) = harness();
    let id_gen = SequentialIdGen::new("agent");
    let clock = FakeClock::default();
    let bus = EventBus::new();

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    let agent = spawn_agent(&root, &id_gen, &clock, &bus, &mux_dyn, &server_controller, &sdk_client, params("alpha"))
        .await
        .unwrap();

    kill_agent(&root, &id_gen, &clock, &bus, &mux_dyn, &server_controller, &AgentId::new("leader-1"), &agent.id, true)
        .await
        .unwrap();

    let persisted = octeam_engine::agents::get_agent(&root, &agent.id).unwrap();
    assert_eq!(persisted.status, octeam_core::AgentStatus::Terminated);

    let team = octeam_engine::teams::get_team_info(&root, "alpha").unwrap();
    assert!(!team.is_member(&agent.id));

    assert!(mux.calls().iter().any(|c| matches!(c, MuxCall::KillPane { .. })));
    let stopped = runtime.calls().iter().any(|c| matches!(c, octeam_adapters::RuntimeCall::Terminate { .. }));
    assert!(stopped, "sole remaining session should reap the backing server");
}

#[tokio::test]
async fn recover_from_context_limit_rotates_session_and_resends_captured_context() {
    let (_dir, root) = root();
    let (mux, mux_dyn, runtime, server_controller, sdk_client) = harness();
    let id_gen = SequentialIdGen::new("agent");
    let clock = FakeClock::default();
    let bus = EventBus::new();

    octeam_engine::teams::spawn_team(&root, FIXED_NOW, "alpha", AgentId::new("leader-1")).unwrap();
    let agent = spawn_agent(&root, &id_gen, &clock, &bus, &mux_dyn, &server_controller, &sdk_client, params("alpha"))
        .await
        .unwrap();
    mux.set_pane_output(agent.pane_id.as_deref().unwrap(), "previous output worth keeping");

    let updated = recover_from_context_limit(&root, &clock, &mux_dyn, &sdk_client, "127.0.0.1", &agent.id)
        .await
        .unwrap();

    assert_ne!(updated.session_id, agent.session_id);
    assert_eq!(updated.session_rotation_count, 1);
    assert!(runtime.calls().iter().any(|c| matches!(c,
        octeam_adapters::RuntimeCall::SendPrompt { prompt, .. } if prompt.contains("previous output worth keeping")
    )));
}
