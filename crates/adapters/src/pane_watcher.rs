// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secondary liveness signal: classify a captured tmux pane's trailing text
//! into an [`AgentState`], independent of the AI-agent-runtime's SSE event
//! stream. Used when that stream is unavailable or lagging; the heartbeat
//! thresholds in spec.md §4.4 remain the authoritative source of truth.

/// Coarse classification of what an agent's pane currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentState {
    Working,
    WaitingForInput,
    Failed(AgentError),
    SessionGone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    ContextLimit,
    Unauthorized,
    OutOfCredits,
    NoInternet,
    RateLimited,
    Other(String),
}

/// Pane-text-only liveness classifier. `capture_pane` output is the last
/// `N` lines of a terminal; this reads only the trailing non-blank line,
/// mirroring the teacher's incremental session-log parser but over tmux
/// text instead of a JSONL transcript.
pub struct PaneWatcher;

impl PaneWatcher {
    /// Empty captured text means the pane (and likely the whole tmux
    /// session) is gone.
    pub fn classify(captured_text: &str) -> AgentState {
        let Some(last_line) = captured_text.lines().rev().find(|l| !l.trim().is_empty()) else {
            return AgentState::SessionGone;
        };
        if let Some(error) = detect_error(last_line) {
            return AgentState::Failed(error);
        }
        if looks_like_prompt(last_line) {
            AgentState::WaitingForInput
        } else {
            AgentState::Working
        }
    }
}

fn detect_error(line: &str) -> Option<AgentError> {
    let lower = line.to_lowercase();
    let has = |ps: &[&str]| ps.iter().any(|p| lower.contains(p));
    if has(&["context limit", "context length", "context window", "conversation too long"]) {
        Some(AgentError::ContextLimit)
    } else if has(&["unauthorized", "invalid api key"]) {
        Some(AgentError::Unauthorized)
    } else if has(&["credit", "quota", "billing"]) {
        Some(AgentError::OutOfCredits)
    } else if has(&["network", "connection refused", "offline"]) {
        Some(AgentError::NoInternet)
    } else if has(&["rate limit", "too many requests"]) {
        Some(AgentError::RateLimited)
    } else if has(&["error:", "panic:", "traceback"]) {
        Some(AgentError::Other(line.trim().to_string()))
    } else {
        None
    }
}

/// A trailing shell-prompt-shaped line (`$ `, `> `, `opencode>`, a bare
/// cursor) means the agent is idle, waiting on the next instruction.
fn looks_like_prompt(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.ends_with('$') || trimmed.ends_with('>') || trimmed.ends_with('#')
}
