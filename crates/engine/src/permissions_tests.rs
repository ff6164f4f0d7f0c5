// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_core::test_support::sample_team;

#[test]
fn no_agent_in_scope_is_always_allowed() {
    let team = sample_team("alpha");
    check_permission(&team, None, "delete-team").unwrap();
}

#[test]
fn default_worker_is_denied_team_management() {
    let team = sample_team("alpha");
    let err = check_permission(&team, Some(AgentRole::Worker), "delete-team").unwrap_err();
    assert_eq!(err.category(), "permission");
}

#[test]
fn default_leader_is_denied_claim_task() {
    let team = sample_team("alpha");
    let err = check_permission(&team, Some(AgentRole::Leader), "claim-task").unwrap_err();
    assert_eq!(err.category(), "permission");
}

#[test]
fn reviewer_whitelist_rejects_non_listed_operation() {
    let team = sample_team("alpha");
    check_permission(&team, Some(AgentRole::Reviewer), "update-task").unwrap();
    let err = check_permission(&team, Some(AgentRole::Reviewer), "spawn-agent").unwrap_err();
    assert_eq!(err.category(), "permission");
}

#[test]
fn team_defined_role_overrides_default_map() {
    let mut team = sample_team("alpha");
    team.roles.push(RoleDefinition {
        name: "worker".to_string(),
        allowed_tools: vec!["claim-task".to_string()],
        denied_tools: Vec::new(),
    });
    check_permission(&team, Some(AgentRole::Worker), "claim-task").unwrap();
    let err = check_permission(&team, Some(AgentRole::Worker), "delete-team").unwrap_err();
    assert_eq!(err.category(), "permission");
}
