// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role-based permission checks (spec.md §4.6), consulted at the entry of
//! sensitive operations.

use octeam_core::{AgentRole, CoordError, CoordResult, RoleDefinition, Team};

/// Built-in permission map, used when a team defines no matching role.
fn default_role_definition(role: AgentRole) -> RoleDefinition {
    match role {
        AgentRole::Leader => RoleDefinition {
            name: "leader".to_string(),
            allowed_tools: Vec::new(),
            denied_tools: vec!["claim-task".to_string()],
        },
        AgentRole::Worker => RoleDefinition {
            name: "worker".to_string(),
            allowed_tools: Vec::new(),
            denied_tools: vec![
                "spawn-team".to_string(),
                "delete-team".to_string(),
                "spawn-agent".to_string(),
                "kill-agent".to_string(),
            ],
        },
        AgentRole::Reviewer => RoleDefinition {
            name: "reviewer".to_string(),
            allowed_tools: vec![
                "update-task".to_string(),
                "get-tasks".to_string(),
                "send-message".to_string(),
                "broadcast-message".to_string(),
                "read-messages".to_string(),
                "poll-inbox".to_string(),
            ],
            denied_tools: Vec::new(),
        },
        AgentRole::TaskManager => RoleDefinition {
            name: "task-manager".to_string(),
            allowed_tools: Vec::new(),
            denied_tools: vec![
                "spawn-team".to_string(),
                "delete-team".to_string(),
                "spawn-agent".to_string(),
                "kill-agent".to_string(),
            ],
        },
    }
}

/// Resolve which tools a given agent role may invoke, honoring a team's
/// own role definitions before falling back to the built-in default map
/// (spec.md §4.6 lookup path, steps 2-3).
fn resolve_role_definition(team: &Team, role: AgentRole) -> RoleDefinition {
    team.role_definition(&role.to_string())
        .cloned()
        .unwrap_or_else(|| default_role_definition(role))
}

/// *checkPermission* (spec.md §4.6): deny-then-allow. A caller with no
/// agent id in scope (host-initiated operation) is always allowed.
pub fn check_permission(
    team: &Team,
    role: Option<AgentRole>,
    operation: &str,
) -> CoordResult<()> {
    let role = match role {
        Some(r) => r,
        None => return Ok(()),
    };

    let definition = resolve_role_definition(team, role);

    if definition.denied_tools.iter().any(|t| t == operation) {
        return Err(CoordError::permission(format!(
            "role {role} may not invoke {operation}"
        )));
    }

    if !definition.allowed_tools.is_empty() && !definition.allowed_tools.iter().any(|t| t == operation) {
        return Err(CoordError::permission(format!(
            "role {role} is not whitelisted for {operation}"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "permissions_tests.rs"]
mod tests;
