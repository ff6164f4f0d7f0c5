// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team templates (spec.md §4.7): project-local directory takes precedence
//! over a user-global fallback; three built-ins ship pre-loaded.

use octeam_core::{CoordError, CoordResult, RoleDefinition, Team, TeamTemplate, Topology, WorkflowConfig};
use octeam_storage::{lock_exclusive, read_validated, write_atomic, StorageRoot};
use std::path::PathBuf;

fn user_templates_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".opencode-teams")
        .join("templates")
}

fn built_in(name: &str) -> Option<TeamTemplate> {
    match name {
        "code-review" => Some(TeamTemplate {
            name: "code-review".to_string(),
            description: Some("Leader reviews; workers implement".to_string()),
            topology: Topology::Hierarchical,
            roles: vec![RoleDefinition {
                name: "reviewer".to_string(),
                allowed_tools: vec![
                    "update-task".to_string(),
                    "get-tasks".to_string(),
                    "send-message".to_string(),
                ],
                denied_tools: Vec::new(),
            }],
            workflow_config: None,
            default_tasks: vec![
                octeam_core::DefaultTask {
                    title: "Implement change".to_string(),
                    description: None,
                    priority: octeam_core::TaskPriority::Normal,
                    depends_on_titles: Vec::new(),
                },
                octeam_core::DefaultTask {
                    title: "Review change".to_string(),
                    description: None,
                    priority: octeam_core::TaskPriority::High,
                    depends_on_titles: vec!["Implement change".to_string()],
                },
                octeam_core::DefaultTask {
                    title: "Address review feedback".to_string(),
                    description: None,
                    priority: octeam_core::TaskPriority::High,
                    depends_on_titles: vec!["Review change".to_string()],
                },
            ],
            created_at: "1970-01-01T00:00:00.000Z".to_string(),
        }),
        "leader-workers" => Some(TeamTemplate {
            name: "leader-workers".to_string(),
            description: Some("Hierarchical team with active workflow monitoring".to_string()),
            topology: Topology::Hierarchical,
            roles: Vec::new(),
            workflow_config: Some(WorkflowConfig {
                enabled: true,
                ..WorkflowConfig::default()
            }),
            default_tasks: Vec::new(),
            created_at: "1970-01-01T00:00:00.000Z".to_string(),
        }),
        "swarm" => Some(TeamTemplate {
            name: "swarm".to_string(),
            description: Some("Flat team of interchangeable workers".to_string()),
            topology: Topology::Flat,
            roles: Vec::new(),
            workflow_config: None,
            default_tasks: Vec::new(),
            created_at: "1970-01-01T00:00:00.000Z".to_string(),
        }),
        _ => None,
    }
}

/// *loadTemplate*: project-local, then user-global, then built-in.
pub fn load_template(root: &StorageRoot, name: &str) -> CoordResult<TeamTemplate> {
    let project_path = root.template_file(name);
    if project_path.exists() {
        return read_validated(&project_path).map_err(CoordError::from);
    }

    let user_path = user_templates_dir().join(format!("{name}.json"));
    if user_path.exists() {
        return read_validated(&user_path).map_err(CoordError::from);
    }

    built_in(name).ok_or_else(|| CoordError::not_found(format!("template {name}")))
}

/// *saveTemplate*: always writes project-local.
pub fn save_template(root: &StorageRoot, template: &TeamTemplate) -> CoordResult<()> {
    let lock_path = root.templates_dir().join(".lock");
    let _guard = lock_exclusive(&lock_path)?;
    write_atomic(&root.template_file(&template.name), template).map_err(CoordError::from)
}

/// *saveFromTeam*: snapshots a running team's shape into a new template.
pub fn save_from_team(
    root: &StorageRoot,
    now: impl Into<String>,
    team: &Team,
    template_name: &str,
) -> CoordResult<TeamTemplate> {
    let template = TeamTemplate {
        name: template_name.to_string(),
        description: team.description.clone(),
        topology: team.topology,
        roles: team.roles.clone(),
        workflow_config: team.workflow.clone(),
        default_tasks: Vec::new(),
        created_at: now.into(),
    };
    save_template(root, &template)?;
    Ok(template)
}

/// *listTemplates*: project-local directory entries, user-global entries
/// not already shadowed by a project-local one of the same name, plus the
/// three built-ins not already shadowed by either.
pub fn list_templates(root: &StorageRoot) -> CoordResult<Vec<String>> {
    let mut names = Vec::new();

    let project_dir = root.templates_dir();
    if project_dir.exists() {
        for entry in std::fs::read_dir(&project_dir)
            .map_err(|e| CoordError::unavailable(format!("reading {}: {e}", project_dir.display())))?
        {
            let Ok(entry) = entry else { continue };
            if let Some(stem) = entry.file_name().to_str().and_then(|s| s.strip_suffix(".json")) {
                names.push(stem.to_string());
            }
        }
    }

    let user_dir = user_templates_dir();
    if user_dir.exists() {
        if let Ok(entries) = std::fs::read_dir(&user_dir) {
            for entry in entries.flatten() {
                if let Some(stem) = entry.file_name().to_str().and_then(|s| s.strip_suffix(".json")) {
                    if !names.contains(&stem.to_string()) {
                        names.push(stem.to_string());
                    }
                }
            }
        }
    }

    for builtin in ["code-review", "leader-workers", "swarm"] {
        if !names.iter().any(|n| n == builtin) {
            names.push(builtin.to_string());
        }
    }

    Ok(names)
}

/// *deleteTemplate*: project-local only; built-ins and the user-global
/// fallback are not removable through this operation.
pub fn delete_template(root: &StorageRoot, name: &str) -> CoordResult<()> {
    let path = root.template_file(name);
    if !path.exists() {
        return Err(CoordError::not_found(format!("template {name}")));
    }
    std::fs::remove_file(&path)
        .map_err(|e| CoordError::unavailable(format!("removing {}: {e}", path.display())))
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
