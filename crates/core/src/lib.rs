// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! octeam-core: data model and identifier primitives for the opencode-teams
//! coordination core.
//!
//! This crate owns no I/O. Every type here is a plain, serde-round-trippable
//! value; mutation rules (status machines, cascade unblocking, cycle
//! detection) live in `octeam-engine`, which operates on these values through
//! `octeam-storage`.

pub mod agent;
pub mod clock;
pub mod color;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod id;
pub mod message;
pub mod server;
pub mod task;
pub mod team;
pub mod template;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{AgentRole, AgentStatus, AgentId, AgentRecord};
pub use clock::{epoch_ms_from_iso8601, Clock, FakeClock, SystemClock};
pub use color::{ColorPool, PALETTE};
pub use dispatch::{
    Action, Condition, ConditionOperator, DispatchLogEntry, DispatchRule, EventType, ResourceKind,
};
pub use error::{CoordError, CoordResult};
pub use event::Event;
pub use id::{IdGen, ShortId, SequentialIdGen, UuidIdGen};
pub use message::{Inbox, Message, MessageType, BROADCAST};
pub use server::ServerInfo;
pub use task::{Task, TaskId, TaskInput, TaskPriority, TaskStatus, TaskUpdate};
pub use team::{Member, RoleDefinition, Team, Topology, WorkflowConfig};
pub use template::{DefaultTask, TeamTemplate};
