// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octeam dashboard [team]` (spec.md §6 CLI surface): a composite team /
//! agent / task / recent-message readout for a human at a terminal.

use anyhow::{anyhow, Result};
use octeam_core::TaskStatus;
use octeam_daemon::Coordinator;

pub async fn render(coordinator: &Coordinator, team: Option<String>) -> Result<()> {
    let team_name = team
        .or_else(crate::env::team_name)
        .ok_or_else(|| anyhow!("no team in scope: pass a team name or set OPENCODE_TEAM_NAME"))?;

    let team = coordinator.get_team_info(&team_name)?;
    println!("== {} ({:?}) ==", team.name, team.topology);
    if let Some(description) = &team.description {
        println!("{description}");
    }

    println!("-- agents --");
    let agents = coordinator.list_agents(Some(&team_name))?;
    if agents.is_empty() {
        println!("(none)");
    }
    for agent in &agents {
        let role = if agent.id == team.leader { "leader".to_string() } else { agent.role.to_string() };
        println!("{}\t{role}\t{:?}\t{}", agent.name, agent.status, agent.id);
    }

    println!("-- tasks --");
    let tasks = coordinator.get_tasks(&team_name, &octeam_engine::tasks::TaskFilter::default())?;
    let pending = tasks.iter().filter(|t| t.status == TaskStatus::Pending).count();
    let in_progress = tasks.iter().filter(|t| t.status == TaskStatus::InProgress).count();
    let completed = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count();
    println!("{pending} pending, {in_progress} in progress, {completed} completed");
    for task in tasks.iter().filter(|t| t.status != TaskStatus::Completed) {
        let owner = task.owner.as_ref().map(|o| o.to_string()).unwrap_or_else(|| "-".to_string());
        println!("{}\t{:?}\t{:?}\towner={owner}", task.title, task.status, task.priority);
    }

    println!("-- recent messages (leader) --");
    let messages = coordinator.read_messages(&team_name, &team.leader, None)?;
    for message in messages.iter().rev().take(10) {
        println!("[{}] {} -> {}: {}", message.timestamp, message.from, message.to, message.body);
    }
    if messages.is_empty() {
        println!("(none)");
    }

    Ok(())
}
