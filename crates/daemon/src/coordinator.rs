// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Coordinator` facade (spec.md §9 Design Notes): a single explicit
//! handle bundling storage, the injected `IdGen`/`Clock`, the event bus, and
//! every adapter trait object, replacing the original implementation's
//! global process state. Every method here is a thin wrapper around
//! `octeam-engine`/`octeam-daemon::{agents,server}` calls that also takes
//! care of emitting any resulting events onto the bus.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use octeam_adapters::{
    DesktopNotifyAdapter, HttpRuntime, MultiplexerAdapter, NotifyAdapter, SdkClient,
    ServerController, TmuxAdapter,
};
use octeam_core::{
    AgentId, AgentRecord, AgentRole, AgentStatus, Clock, CoordError, CoordResult, HeartbeatSource,
    IdGen, Message, SystemClock, Task, TaskId, TaskInput, TaskUpdate, Team, TeamTemplate, UuidIdGen,
};
use octeam_engine::tasks::TaskFilter;
use octeam_storage::{write_atomic, StorageRoot};

use crate::event_bus::EventBus;
use crate::{agents, dispatch, server, sse, sweep, workflow};

/// Construction parameters for [`Coordinator::new`].
pub struct CoordinatorConfig {
    pub project_path: String,
}

/// The one place every tool-surface operation (spec.md §6) goes through.
/// Holds the dependencies every other module in this workspace already
/// takes as explicit parameters, so callers (the CLI, an SSE loop, the
/// stale-agent sweep) never have to assemble them by hand.
pub struct Coordinator {
    root: Arc<StorageRoot>,
    project_path: String,
    id_gen: Arc<dyn IdGen>,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    multiplexer: Arc<dyn MultiplexerAdapter>,
    server_controller: Arc<dyn ServerController>,
    sdk_client: Arc<dyn SdkClient>,
    notifier: Arc<dyn NotifyAdapter>,
}

impl Coordinator {
    /// Real-world wiring: tmux, an `opencode serve` subprocess over HTTP/SSE,
    /// and desktop notifications.
    pub fn new(config: CoordinatorConfig) -> Self {
        let runtime = Arc::new(HttpRuntime::new());
        Self::with_parts(
            StorageRoot::new(&config.project_path),
            config.project_path,
            Arc::new(UuidIdGen),
            Arc::new(SystemClock),
            Arc::new(TmuxAdapter::new()),
            runtime.clone() as Arc<dyn ServerController>,
            runtime as Arc<dyn SdkClient>,
            Arc::new(DesktopNotifyAdapter::default()),
        )
    }

    /// Fully explicit constructor used by tests (and by [`Coordinator::new`])
    /// to inject fakes for every adapter and the clock/id source.
    #[allow(clippy::too_many_arguments)]
    pub fn with_parts(
        root: StorageRoot,
        project_path: String,
        id_gen: Arc<dyn IdGen>,
        clock: Arc<dyn Clock>,
        multiplexer: Arc<dyn MultiplexerAdapter>,
        server_controller: Arc<dyn ServerController>,
        sdk_client: Arc<dyn SdkClient>,
        notifier: Arc<dyn NotifyAdapter>,
    ) -> Self {
        let root = Arc::new(root);
        let bus = EventBus::new();
        dispatch::install(&bus, Arc::clone(&root), Arc::clone(&id_gen), Arc::clone(&clock));
        workflow::install(&bus, Arc::clone(&root), Arc::clone(&id_gen), Arc::clone(&clock));

        Self {
            root,
            project_path,
            id_gen,
            clock,
            bus,
            multiplexer,
            server_controller,
            sdk_client,
            notifier,
        }
    }

    pub fn storage_root(&self) -> &StorageRoot {
        &self.root
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn notifier(&self) -> &Arc<dyn NotifyAdapter> {
        &self.notifier
    }

    // ---- background loops -------------------------------------------------

    /// Start the stale-agent sweep (spec.md §4.4) on its own interval timer.
    pub fn spawn_stale_sweep(&self) -> tokio::task::JoinHandle<()> {
        sweep::spawn(Arc::clone(&self.root), Arc::clone(&self.id_gen), Arc::clone(&self.clock))
    }

    /// Start draining one backing server's SSE stream. The caller is
    /// expected to have already brought that server up via [`Coordinator::ensure_server`].
    pub fn spawn_sse_consumer(&self, hostname: impl Into<String>, port: u16) -> tokio::task::JoinHandle<()> {
        let root = Arc::clone(&self.root);
        let clock = Arc::clone(&self.clock);
        let multiplexer = Arc::clone(&self.multiplexer);
        let sdk_client = Arc::clone(&self.sdk_client);
        let hostname = hostname.into();
        tokio::spawn(async move { sse::run(root, clock, multiplexer, sdk_client, hostname, port).await })
    }

    // ---- server lifecycle (spec.md §4.4 Server controller) ----------------

    pub async fn ensure_server(&self) -> CoordResult<octeam_core::ServerInfo> {
        let now = self.clock.now_iso8601();
        server::ensure_running(&self.root, now, &self.server_controller, &self.project_path).await
    }

    pub async fn stop_server(&self) -> CoordResult<()> {
        server::stop(&self.root, &self.server_controller, &self.project_path).await
    }

    // ---- tmux session lifecycle (CLI surface: start/stop/layout/add-pane) --

    /// The tmux-like session name a team's panes live under.
    pub fn session_name(&self, team_name: &str) -> String {
        format!("octeam-{team_name}")
    }

    fn to_coord_error(err: octeam_adapters::MultiplexerError) -> CoordError {
        CoordError::unavailable(err.to_string())
    }

    /// `start <name>` (spec.md §6 CLI surface): bring up the team's tmux
    /// session and its backing server, creating the session if absent.
    pub async fn ensure_session(&self, team_name: &str) -> CoordResult<()> {
        let session = self.session_name(team_name);
        if !self.multiplexer.has_session(&session).await.map_err(Self::to_coord_error)? {
            self.multiplexer
                .new_session(&session, std::path::Path::new(&self.project_path))
                .await
                .map_err(Self::to_coord_error)?;
        }
        Ok(())
    }

    /// `stop <name>`: kill the tmux session and the team's backing server.
    pub async fn kill_session(&self, team_name: &str) -> CoordResult<()> {
        let session = self.session_name(team_name);
        if self.multiplexer.has_session(&session).await.map_err(Self::to_coord_error)? {
            self.multiplexer.kill_session(&session).await.map_err(Self::to_coord_error)?;
        }
        Ok(())
    }

    /// `layout <name> [layout]`.
    pub async fn select_layout(&self, team_name: &str, layout: &str) -> CoordResult<()> {
        let session = self.session_name(team_name);
        self.multiplexer.select_layout(&session, layout).await.map_err(Self::to_coord_error)
    }

    /// `add-pane <name> [cmd]`: split a new pane off the team's session and
    /// optionally run `cmd` in it. Returns the new pane id.
    pub async fn add_pane(&self, team_name: &str, cmd: Option<&str>) -> CoordResult<String> {
        let session = self.session_name(team_name);
        let pane = self
            .multiplexer
            .split_window(&session, std::path::Path::new(&self.project_path))
            .await
            .map_err(Self::to_coord_error)?;
        if let Some(cmd) = cmd {
            self.multiplexer.send_keys(&pane, cmd).await.map_err(Self::to_coord_error)?;
        }
        Ok(pane)
    }

    // ---- team lifecycle -----------------------------------------------------

    pub fn spawn_team(&self, team_name: &str, leader: AgentId) -> CoordResult<Team> {
        let now = self.clock.now_iso8601();
        let team = octeam_engine::teams::spawn_team(&self.root, now.clone(), team_name, leader)?;
        self.bus.emit(&octeam_core::Event::new(
            self.id_gen.next(),
            octeam_core::EventType::TeamCreated,
            team_name,
            now,
        ));
        Ok(team)
    }

    /// *spawnTeamFromTemplate* (spec.md §4.7): applies the template's
    /// topology/roles/workflow config, then instantiates its default tasks,
    /// resolving `depends_on_titles` against the ids just created.
    pub fn spawn_team_from_template(
        &self,
        team_name: &str,
        template_name: &str,
        leader: AgentId,
    ) -> CoordResult<Team> {
        let template: TeamTemplate = octeam_engine::templates::load_template(&self.root, template_name)?;
        let now = self.clock.now_iso8601();

        let mut team = octeam_engine::teams::spawn_team(&self.root, now.clone(), team_name, leader)?;
        team.topology = template.topology;
        team.roles = template.roles.clone();
        team.workflow = template.workflow_config.clone();
        team.template_source = Some(template.name.clone());
        write_atomic(&self.root.team_config(team_name), &team).map_err(CoordError::from)?;
        self.bus.emit(&octeam_core::Event::new(
            self.id_gen.next(),
            octeam_core::EventType::TeamCreated,
            team_name,
            now.clone(),
        ));

        let mut title_to_id: HashMap<String, TaskId> = HashMap::new();
        for default_task in &template.default_tasks {
            let dependencies = default_task
                .depends_on_titles
                .iter()
                .filter_map(|title| title_to_id.get(title).cloned())
                .collect();
            let mut input: TaskInput = default_task.clone().into_task_input();
            input.dependencies = dependencies;

            let mutation = octeam_engine::tasks::create_task(&self.root, self.id_gen.as_ref(), now.clone(), team_name, input)?;
            self.bus.emit_all(&mutation.events);
            title_to_id.insert(default_task.title.clone(), mutation.task.id);
        }

        octeam_engine::teams::get_team_info(&self.root, team_name)
    }

    pub fn discover_teams(&self) -> CoordResult<Vec<Team>> {
        octeam_engine::teams::discover_teams(&self.root)
    }

    pub fn join_team(
        &self,
        team_name: &str,
        agent_id: AgentId,
        name: impl Into<String>,
        role: impl Into<String>,
    ) -> CoordResult<Team> {
        let now = self.clock.now_iso8601();
        octeam_engine::teams::join_team(&self.root, now, team_name, agent_id, name, role)
    }

    pub fn get_team_info(&self, team_name: &str) -> CoordResult<Team> {
        octeam_engine::teams::get_team_info(&self.root, team_name)
    }

    pub fn delete_team(&self, team_name: &str) -> CoordResult<()> {
        octeam_engine::teams::delete_team(&self.root, team_name)
    }

    // ---- messaging (spec.md §4.3) -------------------------------------------

    pub fn send_message(&self, team_name: &str, from: &AgentId, to: &AgentId, body: impl Into<String>) -> CoordResult<Message> {
        let now = self.clock.now_iso8601();
        octeam_engine::messaging::write(&self.root, now, team_name, from, to, body)
    }

    pub fn broadcast_message(&self, team_name: &str, from: &AgentId, body: impl Into<String>) -> CoordResult<Message> {
        let now = self.clock.now_iso8601();
        octeam_engine::messaging::broadcast(&self.root, now, team_name, from, body)
    }

    pub fn read_messages(&self, team_name: &str, agent_id: &AgentId, since: Option<&str>) -> CoordResult<Vec<Message>> {
        octeam_engine::messaging::read_messages(&self.root, team_name, agent_id, since)
    }

    /// Blocks the calling thread for up to `timeout` (default 30s); run it
    /// via `tokio::task::spawn_blocking` from an async caller.
    pub fn poll_inbox(
        &self,
        team_name: &str,
        agent_id: &AgentId,
        timeout: Option<Duration>,
        since: Option<&str>,
    ) -> CoordResult<Vec<Message>> {
        octeam_engine::messaging::poll_inbox(&self.root, team_name, agent_id, timeout, since)
    }

    pub fn request_shutdown(&self, team_name: &str, agent_id: &AgentId) -> CoordResult<()> {
        let now = self.clock.now_iso8601();
        octeam_engine::messaging::request_shutdown(&self.root, now, team_name, agent_id)
    }

    pub fn approve_shutdown(&self, team_name: &str, agent_id: &AgentId) -> CoordResult<()> {
        let now = self.clock.now_iso8601();
        octeam_engine::messaging::approve_shutdown(&self.root, now, team_name, agent_id)
    }

    // ---- tasks (spec.md §4.2) -----------------------------------------------

    pub fn create_task(&self, team_name: &str, input: TaskInput) -> CoordResult<Task> {
        let now = self.clock.now_iso8601();
        let mutation = octeam_engine::tasks::create_task(&self.root, self.id_gen.as_ref(), now, team_name, input)?;
        self.bus.emit_all(&mutation.events);
        Ok(mutation.task)
    }

    pub fn get_task(&self, team_name: &str, task_id: &TaskId) -> CoordResult<Task> {
        octeam_engine::tasks::get_task(&self.root, team_name, task_id)
    }

    pub fn get_tasks(&self, team_name: &str, filter: &TaskFilter) -> CoordResult<Vec<Task>> {
        octeam_engine::tasks::get_tasks(&self.root, team_name, filter)
    }

    pub fn update_task(&self, team_name: &str, task_id: &TaskId, updates: TaskUpdate) -> CoordResult<Task> {
        let now = self.clock.now_iso8601();
        let mutation = octeam_engine::tasks::update_task(&self.root, self.id_gen.as_ref(), now, team_name, task_id, updates)?;
        self.bus.emit_all(&mutation.events);
        Ok(mutation.task)
    }

    pub fn delete_task(&self, team_name: &str, task_id: &TaskId) -> CoordResult<()> {
        octeam_engine::tasks::delete_task(&self.root, team_name, task_id)
    }

    pub fn claim_task(
        &self,
        team_name: &str,
        task_id: &TaskId,
        agent_id: &AgentId,
        claimer_role: Option<AgentRole>,
    ) -> CoordResult<Task> {
        let now = self.clock.now_iso8601();
        octeam_engine::tasks::claim_task(&self.root, now, team_name, task_id, agent_id, claimer_role)
    }

    // ---- agent lifecycle (spec.md §4.4) -------------------------------------

    pub async fn spawn_agent(&self, params: agents::SpawnAgentParams) -> CoordResult<AgentRecord> {
        agents::spawn_agent(
            &self.root,
            self.id_gen.as_ref(),
            self.clock.as_ref(),
            &self.bus,
            &self.multiplexer,
            &self.server_controller,
            &self.sdk_client,
            params,
        )
        .await
    }

    pub async fn kill_agent(&self, caller: &AgentId, target: &AgentId, forced: bool) -> CoordResult<()> {
        agents::kill_agent(
            &self.root,
            self.id_gen.as_ref(),
            self.clock.as_ref(),
            &self.bus,
            &self.multiplexer,
            &self.server_controller,
            caller,
            target,
            forced,
        )
        .await
    }

    pub async fn recover_from_context_limit(&self, hostname: &str, agent_id: &AgentId) -> CoordResult<AgentRecord> {
        agents::recover_from_context_limit(&self.root, self.clock.as_ref(), &self.multiplexer, &self.sdk_client, hostname, agent_id).await
    }

    pub fn heartbeat(&self, agent_id: &AgentId, source: HeartbeatSource, status: Option<AgentStatus>) -> CoordResult<AgentRecord> {
        let now = self.clock.now_iso8601();
        octeam_engine::agents::heartbeat(&self.root, now, agent_id, source, status)
    }

    pub fn get_agent_status(&self, agent_id: &AgentId) -> CoordResult<AgentRecord> {
        octeam_engine::agents::get_agent(&self.root, agent_id)
    }

    pub fn list_agents(&self, team_name: Option<&str>) -> CoordResult<Vec<AgentRecord>> {
        octeam_engine::agents::list_agents(&self.root, team_name)
    }

    // ---- templates (spec.md §4.7) -------------------------------------------

    pub fn load_template(&self, name: &str) -> CoordResult<TeamTemplate> {
        octeam_engine::templates::load_template(&self.root, name)
    }

    pub fn save_template(&self, template: &TeamTemplate) -> CoordResult<()> {
        octeam_engine::templates::save_template(&self.root, template)
    }

    pub fn save_template_from_team(&self, team_name: &str, template_name: &str) -> CoordResult<TeamTemplate> {
        let team = octeam_engine::teams::get_team_info(&self.root, team_name)?;
        let now = self.clock.now_iso8601();
        octeam_engine::templates::save_from_team(&self.root, now, &team, template_name)
    }

    pub fn list_templates(&self) -> CoordResult<Vec<String>> {
        octeam_engine::templates::list_templates(&self.root)
    }

    pub fn delete_template(&self, name: &str) -> CoordResult<()> {
        octeam_engine::templates::delete_template(&self.root, name)
    }

    // ---- permissions (spec.md §4.6) -----------------------------------------

    pub fn check_permission(&self, team_name: &str, role: Option<AgentRole>, operation: &str) -> CoordResult<()> {
        let team = octeam_engine::teams::get_team_info(&self.root, team_name)?;
        octeam_engine::permissions::check_permission(&team, role, operation)
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
