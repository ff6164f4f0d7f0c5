// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_sse_frame_extracts_type_and_session_id() {
    let frame = "event: message\ndata: {\"type\":\"session.idle\",\"properties\":{\"sessionID\":\"ses_1\"}}";
    let event = parse_sse_frame(frame).unwrap();
    assert_eq!(event.event_type, "session.idle");
    assert_eq!(event.session_id.as_deref(), Some("ses_1"));
}

#[test]
fn parse_sse_frame_without_session_id_still_parses() {
    let frame = "data: {\"type\":\"server.connected\"}";
    let event = parse_sse_frame(frame).unwrap();
    assert_eq!(event.event_type, "server.connected");
    assert_eq!(event.session_id, None);
}

#[test]
fn parse_sse_frame_ignores_keepalive_comments() {
    let frame = ": keep-alive";
    assert!(parse_sse_frame(frame).is_none());
}

#[test]
fn parse_sse_frame_rejects_malformed_json() {
    let frame = "data: not json";
    assert!(parse_sse_frame(frame).is_none());
}

#[test]
fn base_url_formats_hostname_and_port() {
    assert_eq!(HttpRuntime::base_url("127.0.0.1", 4096), "http://127.0.0.1:4096");
}
