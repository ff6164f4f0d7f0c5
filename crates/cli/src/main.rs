// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! octeam - opencode-teams CLI
//!
//! Thin over `octeam-daemon::Coordinator`: every subcommand parses its args,
//! builds a coordinator, makes one call, and prints the result. All the
//! actual logic lives in `octeam-engine`/`octeam-daemon` (spec.md §6 CLI
//! surface + `tool` JSON passthrough).

mod dashboard;
mod env;
mod output;
mod tool;

use anyhow::Result;
use clap::{Parser, Subcommand};
use octeam_daemon::{Coordinator, CoordinatorConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "octeam", version, about = "Coordinate teams of AI coding agents over tmux")]
struct Cli {
    /// Change to <dir> before doing anything.
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every known team.
    List,
    /// Bring a team's tmux session and backing server online.
    Start { name: String },
    /// Tear down a team's tmux session and backing server.
    Stop { name: String },
    /// Arrange a team's session panes in the given tmux layout.
    Layout {
        name: String,
        layout: Option<String>,
    },
    /// Split a new pane in a team's session, optionally running `cmd` in it.
    AddPane {
        name: String,
        cmd: Option<String>,
    },
    /// Spawn a new agent into a team.
    Launch { team: Option<String> },
    /// Attach the current terminal to a team's tmux session.
    Attach,
    /// Detach the current terminal from its tmux session.
    Detach,
    /// Kill a team's tmux session and backing server.
    Destroy,
    /// Print a one-line status summary for the team in scope.
    Status,
    /// Print team/agent/task/message readout for the team in scope.
    Dashboard { team: Option<String> },
    /// Invoke one tool-surface operation with a JSON input/output envelope.
    Tool {
        /// Operation name, e.g. `spawn-team`, `create-task`, `claim-task`.
        name: String,
        #[arg(long, default_value = "{}")]
        input: String,
    },
}

fn coordinator(directory: &Option<PathBuf>) -> Result<Coordinator> {
    let project_path = match directory {
        Some(dir) => dir.canonicalize()?.display().to_string(),
        None => std::env::current_dir()?.display().to_string(),
    };
    Ok(Coordinator::new(CoordinatorConfig { project_path }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let coordinator = coordinator(&cli.directory)?;

    let outcome = match cli.command {
        Commands::List => list(&coordinator).await,
        Commands::Start { name } => start(&coordinator, &name).await,
        Commands::Stop { name } => stop(&coordinator, &name).await,
        Commands::Layout { name, layout } => {
            layout_cmd(&coordinator, &name, layout.as_deref().unwrap_or("tiled")).await
        }
        Commands::AddPane { name, cmd } => add_pane(&coordinator, &name, cmd.as_deref()).await,
        Commands::Launch { team } => launch(&coordinator, team).await,
        Commands::Attach => attach(&coordinator),
        Commands::Detach => detach(&coordinator),
        Commands::Destroy => destroy(&coordinator).await,
        Commands::Status => status(&coordinator).await,
        Commands::Dashboard { team } => dashboard::render(&coordinator, team).await,
        Commands::Tool { name, input } => tool::run(&coordinator, &name, &input).await,
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

async fn list(coordinator: &Coordinator) -> Result<()> {
    let teams = coordinator.discover_teams()?;
    if teams.is_empty() {
        println!("no teams");
        return Ok(());
    }
    for team in teams {
        println!(
            "{}\t{:?}\t{} member(s)\tleader={}",
            team.name,
            team.topology,
            team.members.len(),
            team.leader
        );
    }
    Ok(())
}

async fn start(coordinator: &Coordinator, name: &str) -> Result<()> {
    if coordinator.get_team_info(name).is_err() {
        let leader = env::agent_id_or(format!("leader-{name}"));
        coordinator.spawn_team(name, leader)?;
    }
    coordinator.ensure_session(name).await?;
    coordinator.ensure_server().await?;
    println!("{name} is up");
    Ok(())
}

async fn stop(coordinator: &Coordinator, name: &str) -> Result<()> {
    coordinator.kill_session(name).await?;
    coordinator.stop_server().await?;
    println!("{name} is down");
    Ok(())
}

async fn layout_cmd(coordinator: &Coordinator, name: &str, layout: &str) -> Result<()> {
    coordinator.select_layout(name, layout).await?;
    println!("{name} layout set to {layout}");
    Ok(())
}

async fn add_pane(coordinator: &Coordinator, name: &str, cmd: Option<&str>) -> Result<()> {
    let pane = coordinator.add_pane(name, cmd).await?;
    println!("{pane}");
    Ok(())
}

async fn launch(coordinator: &Coordinator, team: Option<String>) -> Result<()> {
    let team_name = team.or_else(env::team_name).ok_or_else(|| {
        anyhow::anyhow!("no team in scope: pass a team name or set OPENCODE_TEAM_NAME")
    })?;
    let agent_name = env::agent_name_or_else(|| format!("agent-{}", uuid::Uuid::new_v4()));
    let role = env::agent_role();

    let agent = coordinator
        .spawn_agent(octeam_daemon::SpawnAgentParams {
            team_name,
            name: agent_name,
            role,
            model: env::agent_model(),
            provider_id: env::agent_provider(),
            project_path: env::project_path(),
            initial_prompt: env::initial_prompt(),
        })
        .await?;

    println!("{}\t{}\t{:?}", agent.id, agent.name, agent.status);
    Ok(())
}

fn tmux_exec(args: &[&str]) -> Result<()> {
    let status = std::process::Command::new("tmux").args(args).status()?;
    if !status.success() {
        anyhow::bail!("tmux {args:?} exited with {status}");
    }
    Ok(())
}

fn attach(coordinator: &Coordinator) -> Result<()> {
    let team_name = env::team_name()
        .ok_or_else(|| anyhow::anyhow!("no team in scope: set OPENCODE_TEAM_NAME"))?;
    tmux_exec(&["attach-session", "-t", &coordinator.session_name(&team_name)])
}

fn detach(coordinator: &Coordinator) -> Result<()> {
    let team_name = env::team_name()
        .ok_or_else(|| anyhow::anyhow!("no team in scope: set OPENCODE_TEAM_NAME"))?;
    tmux_exec(&["detach-client", "-s", &coordinator.session_name(&team_name)])
}

async fn destroy(coordinator: &Coordinator) -> Result<()> {
    let team_name = env::team_name()
        .ok_or_else(|| anyhow::anyhow!("no team in scope: set OPENCODE_TEAM_NAME"))?;
    let team = coordinator.get_team_info(&team_name)?;
    let caller = env::agent_id_or(team.leader.to_string());
    for member in &team.members {
        if member.agent_id == team.leader {
            continue;
        }
        let _ = coordinator.kill_agent(&caller, &member.agent_id, true).await;
    }
    coordinator.kill_session(&team_name).await?;
    coordinator.stop_server().await?;
    println!("{team_name} destroyed");
    Ok(())
}

async fn status(coordinator: &Coordinator) -> Result<()> {
    let team_name = env::team_name()
        .ok_or_else(|| anyhow::anyhow!("no team in scope: set OPENCODE_TEAM_NAME"))?;
    let team = coordinator.get_team_info(&team_name)?;
    let agents = coordinator.list_agents(Some(&team_name))?;
    let active = agents.iter().filter(|a| a.is_active()).count();
    let tasks = coordinator.get_tasks(&team_name, &octeam_engine::tasks::TaskFilter::default())?;
    let pending = tasks
        .iter()
        .filter(|t| t.status == octeam_core::TaskStatus::Pending)
        .count();
    println!(
        "{team_name} ({:?}): {active}/{} agent(s) active, {pending}/{} task(s) pending",
        team.topology,
        agents.len(),
        tasks.len()
    );
    Ok(())
}
