// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backing AI-agent-runtime server controller (spec.md §4.4 Server
//! controller): at most one `opencode serve` process per project, reused by
//! every agent spawned against that project.

use md5::{Digest, Md5};
use octeam_adapters::{RuntimeError, ServerController};
use octeam_core::{CoordError, CoordResult, ServerInfo};
use octeam_storage::{lock_exclusive, read_validated, write_atomic, StorageRoot};
use std::sync::Arc;
use std::time::Duration;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const READY_TIMEOUT: Duration = Duration::from_secs(5);
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// `projectHash` for the servers directory name: hex MD5 of the absolute
/// project path (spec.md §3.1 ServerInfo, `servers/<project-hash>/`).
pub fn project_hash(absolute_project_path: &str) -> String {
    format!("{:x}", Md5::digest(absolute_project_path.as_bytes()))
}

fn read_server_info(root: &StorageRoot, hash: &str) -> Option<ServerInfo> {
    let path = root.server_file(hash);
    if !path.exists() {
        return None;
    }
    read_validated(&path).ok()
}

fn write_server_info(root: &StorageRoot, hash: &str, info: &ServerInfo) -> CoordResult<()> {
    write_atomic(&root.server_file(hash), info).map_err(CoordError::from)
}

/// *ensureRunning(projectPath)* (spec.md §4.4): reuse a healthy existing
/// server, or kill the stale one and launch a fresh process.
pub async fn ensure_running(
    root: &StorageRoot,
    now: impl Into<String>,
    controller: &Arc<dyn ServerController>,
    project_path: &str,
) -> CoordResult<ServerInfo> {
    let now = now.into();
    let hash = project_hash(project_path);
    let _guard = lock_exclusive(&root.servers_dir(&hash).join(".lock"))?;

    if let Some(mut info) = read_server_info(root, &hash) {
        if info.is_running && controller.is_alive(info.pid).await {
            if tokio::time::timeout(HEALTH_PROBE_TIMEOUT, controller.probe_ready(&info.hostname, info.port))
                .await
                .unwrap_or(false)
            {
                info.last_health_check = Some(now.clone());
                write_server_info(root, &hash, &info)?;
                return Ok(info);
            }
        }
        // Stale: kill whatever might still be holding the port.
        let _ = controller.kill(info.pid).await;
    }

    let hostname = "127.0.0.1";
    let port = octeam_core::server::derive_port(project_path);
    let log_path = root.server_log(&hash);
    let cwd = std::path::PathBuf::from(project_path);

    let pid = controller
        .spawn(hostname, port, &cwd, &log_path)
        .await
        .map_err(to_coord_error)?;

    let deadline = std::time::Instant::now() + READY_TIMEOUT;
    loop {
        if controller.probe_ready(hostname, port).await {
            break;
        }
        if std::time::Instant::now() >= deadline {
            return Err(CoordError::unavailable(format!(
                "server on port {port} did not become ready within {READY_TIMEOUT:?}"
            )));
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }

    let info = ServerInfo {
        log_path: Some(log_path.display().to_string()),
        last_health_check: Some(now.clone()),
        ..ServerInfo::new(project_path, hash.clone(), pid, port, now)
    };
    write_server_info(root, &hash, &info)?;
    Ok(info)
}

/// *stop(projectPath)* (spec.md §4.4): SIGTERM with grace, then SIGKILL.
pub async fn stop(
    root: &StorageRoot,
    controller: &Arc<dyn ServerController>,
    project_path: &str,
) -> CoordResult<()> {
    let hash = project_hash(project_path);
    let _guard = lock_exclusive(&root.servers_dir(&hash).join(".lock"))?;

    let Some(mut info) = read_server_info(root, &hash) else {
        return Ok(());
    };

    let _ = controller.terminate(info.pid).await;
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while controller.is_alive(info.pid).await {
        if std::time::Instant::now() >= deadline {
            let _ = controller.kill(info.pid).await;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    info.is_running = false;
    write_server_info(root, &hash, &info)
}

/// Increment/decrement the reused server's active-session count (spec.md
/// §3.2: "one server process is reused by all agents of the project").
/// Returns the updated count.
pub fn adjust_active_sessions(root: &StorageRoot, project_path: &str, delta: i32) -> CoordResult<u32> {
    let hash = project_hash(project_path);
    let _guard = lock_exclusive(&root.servers_dir(&hash).join(".lock"))?;
    let Some(mut info) = read_server_info(root, &hash) else {
        return Ok(0);
    };
    info.active_sessions = info.active_sessions.saturating_add_signed(delta);
    write_server_info(root, &hash, &info)?;
    Ok(info.active_sessions)
}

fn to_coord_error(err: RuntimeError) -> CoordError {
    CoordError::unavailable(err.to_string())
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
