// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout (spec.md §3): `<project-root>/.opencode-teams/...`.

use std::path::{Path, PathBuf};

const STORAGE_DIR_NAME: &str = ".opencode-teams";

/// Root of the storage tree for a given project directory, honoring
/// `OPENCODE_PROJECT_ROOT` if set (spec.md §6 Environment variables).
#[derive(Debug, Clone)]
pub struct StorageRoot(PathBuf);

impl StorageRoot {
    pub fn new(project_path: impl AsRef<Path>) -> Self {
        let root = std::env::var_os("OPENCODE_PROJECT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| project_path.as_ref().to_path_buf());
        Self(root.join(STORAGE_DIR_NAME))
    }

    /// Bypasses the environment override; used by tests that need an
    /// isolated tempdir regardless of the ambient environment.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }

    pub fn root(&self) -> &Path {
        &self.0
    }

    pub fn teams_dir(&self) -> PathBuf {
        self.0.join("teams")
    }

    pub fn team_dir(&self, team_name: &str) -> PathBuf {
        self.teams_dir().join(team_name)
    }

    pub fn team_config(&self, team_name: &str) -> PathBuf {
        self.team_dir(team_name).join("config.json")
    }

    pub fn team_lock(&self, team_name: &str) -> PathBuf {
        self.team_dir(team_name).join(".lock")
    }

    pub fn inboxes_dir(&self, team_name: &str) -> PathBuf {
        self.team_dir(team_name).join("inboxes")
    }

    pub fn inbox_file(&self, team_name: &str, agent_id: &str) -> PathBuf {
        self.inboxes_dir(team_name).join(format!("{agent_id}.json"))
    }

    pub fn tasks_dir(&self, team_name: &str) -> PathBuf {
        self.0.join("tasks").join(team_name)
    }

    pub fn task_lock(&self, team_name: &str) -> PathBuf {
        self.tasks_dir(team_name).join(".lock")
    }

    pub fn task_file(&self, team_name: &str, task_id: &str) -> PathBuf {
        self.tasks_dir(team_name).join(format!("{task_id}.json"))
    }

    pub fn agents_dir(&self) -> PathBuf {
        self.0.join("agents")
    }

    pub fn agents_lock(&self) -> PathBuf {
        self.agents_dir().join(".lock")
    }

    pub fn agent_file(&self, agent_id: &str) -> PathBuf {
        self.agents_dir().join(format!("{agent_id}.json"))
    }

    pub fn servers_dir(&self, project_hash: &str) -> PathBuf {
        self.0.join("servers").join(project_hash)
    }

    pub fn server_file(&self, project_hash: &str) -> PathBuf {
        self.servers_dir(project_hash).join("server.json")
    }

    pub fn server_log(&self, project_hash: &str) -> PathBuf {
        self.servers_dir(project_hash).join("server.log")
    }

    pub fn color_pool_file(&self) -> PathBuf {
        self.0.join("color-pool.json")
    }

    pub fn color_pool_lock(&self) -> PathBuf {
        self.0.join("color-pool.lock")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.0.join("templates")
    }

    pub fn template_file(&self, name: &str) -> PathBuf {
        self.templates_dir().join(format!("{name}.json"))
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
