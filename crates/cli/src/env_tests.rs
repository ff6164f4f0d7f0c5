// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear() {
    for key in [
        "OPENCODE_TEAM_NAME",
        "OPENCODE_AGENT_ID",
        "OPENCODE_AGENT_NAME",
        "OPENCODE_AGENT_TYPE",
        "OPENCODE_AGENT_MODEL",
        "OPENCODE_AGENT_PROVIDER",
        "OPENCODE_INITIAL_PROMPT",
        "OPENCODE_PROJECT_ROOT",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn team_name_reads_the_environment_variable() {
    clear();
    assert_eq!(team_name(), None);
    std::env::set_var("OPENCODE_TEAM_NAME", "alpha");
    assert_eq!(team_name(), Some("alpha".to_string()));
    clear();
}

#[test]
#[serial]
fn agent_id_or_falls_back_to_the_default() {
    clear();
    assert_eq!(agent_id_or("leader-1").as_str(), "leader-1");
    std::env::set_var("OPENCODE_AGENT_ID", "agent-9");
    assert_eq!(agent_id_or("leader-1").as_str(), "agent-9");
    clear();
}

#[test]
#[serial]
fn agent_role_defaults_to_worker_and_parses_kebab_case() {
    clear();
    assert_eq!(agent_role(), octeam_core::AgentRole::Worker);
    std::env::set_var("OPENCODE_AGENT_TYPE", "task-manager");
    assert_eq!(agent_role(), octeam_core::AgentRole::TaskManager);
    std::env::set_var("OPENCODE_AGENT_TYPE", "reviewer");
    assert_eq!(agent_role(), octeam_core::AgentRole::Reviewer);
    std::env::set_var("OPENCODE_AGENT_TYPE", "something-unknown");
    assert_eq!(agent_role(), octeam_core::AgentRole::Worker);
    clear();
}

#[test]
#[serial]
fn agent_model_defaults_when_unset() {
    clear();
    assert_eq!(agent_model(), "claude-sonnet");
    std::env::set_var("OPENCODE_AGENT_MODEL", "gpt-5");
    assert_eq!(agent_model(), "gpt-5");
    clear();
}
