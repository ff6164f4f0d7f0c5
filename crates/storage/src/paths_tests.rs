// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn layout_matches_spec_paths() {
    let root = StorageRoot::at("/tmp/proj/.opencode-teams");
    assert_eq!(
        root.team_config("alpha"),
        PathBuf::from("/tmp/proj/.opencode-teams/teams/alpha/config.json")
    );
    assert_eq!(
        root.team_lock("alpha"),
        PathBuf::from("/tmp/proj/.opencode-teams/teams/alpha/.lock")
    );
    assert_eq!(
        root.inbox_file("alpha", "agent-1"),
        PathBuf::from("/tmp/proj/.opencode-teams/teams/alpha/inboxes/agent-1.json")
    );
    assert_eq!(
        root.task_file("alpha", "task-1"),
        PathBuf::from("/tmp/proj/.opencode-teams/tasks/alpha/task-1.json")
    );
    assert_eq!(
        root.agent_file("agent-1"),
        PathBuf::from("/tmp/proj/.opencode-teams/agents/agent-1.json")
    );
    assert_eq!(
        root.color_pool_file(),
        PathBuf::from("/tmp/proj/.opencode-teams/color-pool.json")
    );
    assert_eq!(
        root.template_file("code-review"),
        PathBuf::from("/tmp/proj/.opencode-teams/templates/code-review.json")
    );
    assert_eq!(
        root.color_pool_lock(),
        PathBuf::from("/tmp/proj/.opencode-teams/color-pool.lock")
    );
}

#[test]
fn new_appends_storage_dir_name_to_project_path() {
    std::env::remove_var("OPENCODE_PROJECT_ROOT");
    let root = StorageRoot::new("/tmp/other-proj");
    assert_eq!(root.root(), Path::new("/tmp/other-proj/.opencode-teams"));
}
