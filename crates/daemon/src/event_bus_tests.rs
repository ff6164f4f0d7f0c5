// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_core::CoordError;
use parking_lot::Mutex as StdMutex;
use std::sync::Arc;

fn sample_event(event_type: EventType) -> Event {
    Event::new("evt-1", event_type, "team-a", "2024-01-01T00:00:00.000Z")
}

#[test]
fn handlers_fire_in_registration_order() {
    let bus = EventBus::new();
    let order: Arc<StdMutex<Vec<&'static str>>> = Arc::new(StdMutex::new(Vec::new()));

    let order_a = order.clone();
    bus.subscribe(EventType::TaskCreated, move |_| {
        order_a.lock().push("first");
        Ok(())
    });
    let order_b = order.clone();
    bus.subscribe(EventType::TaskCreated, move |_| {
        order_b.lock().push("second");
        Ok(())
    });

    bus.emit(&sample_event(EventType::TaskCreated));

    assert_eq!(*order.lock(), vec!["first", "second"]);
}

#[test]
fn only_matching_event_type_is_delivered() {
    let bus = EventBus::new();
    let calls = Arc::new(StdMutex::new(0));
    let calls_clone = calls.clone();
    bus.subscribe(EventType::TaskCompleted, move |_| {
        *calls_clone.lock() += 1;
        Ok(())
    });

    bus.emit(&sample_event(EventType::TaskCreated));

    assert_eq!(*calls.lock(), 0);
}

#[test]
fn failing_subscriber_does_not_block_others() {
    let bus = EventBus::new();
    let second_ran = Arc::new(StdMutex::new(false));

    bus.subscribe(EventType::AgentIdle, |_| Err(CoordError::unavailable("boom")));
    let second_ran_clone = second_ran.clone();
    bus.subscribe(EventType::AgentIdle, move |_| {
        *second_ran_clone.lock() = true;
        Ok(())
    });

    bus.emit(&sample_event(EventType::AgentIdle));

    assert!(*second_ran.lock());
}

#[test]
fn unsubscribe_removes_handler() {
    let bus = EventBus::new();
    let calls = Arc::new(StdMutex::new(0));
    let calls_clone = calls.clone();
    let id = bus.subscribe(EventType::TeamCreated, move |_| {
        *calls_clone.lock() += 1;
        Ok(())
    });

    bus.unsubscribe(EventType::TeamCreated, id);
    bus.emit(&sample_event(EventType::TeamCreated));

    assert_eq!(*calls.lock(), 0);
}
