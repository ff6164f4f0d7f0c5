// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_core::test_support::sample_team;
use tempfile::tempdir;

fn root() -> (tempfile::TempDir, StorageRoot) {
    let dir = tempdir().unwrap();
    let root = StorageRoot::at(dir.path().to_path_buf());
    (dir, root)
}

#[test]
fn built_in_templates_load_without_a_project_local_file() {
    let (_dir, root) = root();
    let template = load_template(&root, "code-review").unwrap();
    assert_eq!(template.topology, Topology::Hierarchical);
    assert_eq!(template.default_tasks.len(), 3);

    let swarm = load_template(&root, "swarm").unwrap();
    assert_eq!(swarm.topology, Topology::Flat);

    let leader_workers = load_template(&root, "leader-workers").unwrap();
    assert!(leader_workers.workflow_config.unwrap().enabled);
}

#[test]
fn unknown_template_name_is_not_found() {
    let (_dir, root) = root();
    let err = load_template(&root, "does-not-exist").unwrap_err();
    assert_eq!(err.category(), "not_found");
}

#[test]
fn project_local_template_shadows_built_in_of_same_name() {
    let (_dir, root) = root();
    let custom = TeamTemplate {
        name: "swarm".to_string(),
        description: Some("custom swarm".to_string()),
        topology: Topology::Hierarchical,
        roles: Vec::new(),
        workflow_config: None,
        default_tasks: Vec::new(),
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
    };
    save_template(&root, &custom).unwrap();

    let loaded = load_template(&root, "swarm").unwrap();
    assert_eq!(loaded.description.as_deref(), Some("custom swarm"));
    assert_eq!(loaded.topology, Topology::Hierarchical);
}

#[test]
fn save_from_team_snapshots_topology_and_roles() {
    let (_dir, root) = root();
    let mut team = sample_team("alpha");
    team.topology = Topology::Hierarchical;
    team.roles.push(RoleDefinition {
        name: "reviewer".to_string(),
        allowed_tools: vec!["update-task".to_string()],
        denied_tools: Vec::new(),
    });

    let template = save_from_team(&root, "2024-01-01T00:00:00.000Z", &team, "my-snapshot").unwrap();
    assert_eq!(template.topology, Topology::Hierarchical);
    assert_eq!(template.roles.len(), 1);

    let loaded = load_template(&root, "my-snapshot").unwrap();
    assert_eq!(loaded.name, "my-snapshot");
}

#[test]
fn list_templates_includes_built_ins_and_custom_ones() {
    let (_dir, root) = root();
    save_template(
        &root,
        &TeamTemplate {
            name: "custom".to_string(),
            description: None,
            topology: Topology::Flat,
            roles: Vec::new(),
            workflow_config: None,
            default_tasks: Vec::new(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        },
    )
    .unwrap();

    let names = list_templates(&root).unwrap();
    assert!(names.contains(&"custom".to_string()));
    assert!(names.contains(&"code-review".to_string()));
    assert!(names.contains(&"leader-workers".to_string()));
    assert!(names.contains(&"swarm".to_string()));
}

#[test]
fn delete_template_removes_project_local_only() {
    let (_dir, root) = root();
    save_template(
        &root,
        &TeamTemplate {
            name: "custom".to_string(),
            description: None,
            topology: Topology::Flat,
            roles: Vec::new(),
            workflow_config: None,
            default_tasks: Vec::new(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        },
    )
    .unwrap();

    delete_template(&root, "custom").unwrap();
    let err = delete_template(&root, "code-review").unwrap_err();
    assert_eq!(err.category(), "not_found");
}
