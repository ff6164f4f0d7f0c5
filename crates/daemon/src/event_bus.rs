// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process typed pub/sub (spec.md §4.5 Event bus).
//!
//! A map from event type to a set of handlers. `emit` invokes every handler
//! for that type sequentially in registration order; a handler's failure is
//! logged and swallowed so one bad subscriber never blocks another, nor the
//! caller that emitted the event (spec.md §7 propagation policy).

use octeam_core::{CoordResult, Event, EventType};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type Handler = Arc<dyn Fn(&Event) -> CoordResult<()> + Send + Sync>;

struct Subscription {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct Subscribers {
    by_type: HashMap<EventType, Vec<Subscription>>,
}

/// In-process event bus. Cloning shares the same subscriber set (spec.md
/// §5: "the event bus handler set is process-local").
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Subscribers>>,
    next_id: Arc<AtomicU64>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a handler for `event_type`. Returns an id that
    /// [`EventBus::unsubscribe`] accepts to remove it.
    pub fn subscribe<F>(&self, event_type: EventType, handler: F) -> u64
    where
        F: Fn(&Event) -> CoordResult<()> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .lock()
            .by_type
            .entry(event_type)
            .or_default()
            .push(Subscription { id, handler: Arc::new(handler) });
        id
    }

    pub fn unsubscribe(&self, event_type: EventType, id: u64) {
        if let Some(subs) = self.subscribers.lock().by_type.get_mut(&event_type) {
            subs.retain(|s| s.id != id);
        }
    }

    /// Deliver `event` to every handler registered for its type, in
    /// registration order. Handler errors are logged, not propagated.
    pub fn emit(&self, event: &Event) {
        let handlers: Vec<Handler> = self
            .subscribers
            .lock()
            .by_type
            .get(&event.event_type)
            .map(|subs| subs.iter().map(|s| s.handler.clone()).collect())
            .unwrap_or_default();

        for handler in handlers {
            if let Err(err) = handler(event) {
                tracing::warn!(
                    event_type = %event.event_type,
                    event_id = %event.id,
                    error = %err,
                    "event subscriber failed"
                );
            }
        }
    }

    /// Emit every event produced by an engine mutation, in order.
    pub fn emit_all(&self, events: &[Event]) {
        for event in events {
            self.emit(event);
        }
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
