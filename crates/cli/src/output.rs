// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON rendering helpers shared by the `tool` passthrough and `dashboard`.

use serde_json::Value;

pub fn print_json(value: &Value) {
    match serde_json::to_string(value) {
        Ok(text) => println!("{text}"),
        Err(err) => println!("{{\"success\":false,\"error\":\"corrupted: {err}\"}}"),
    }
}

pub fn error_envelope(category: &str, detail: &str) -> Value {
    serde_json::json!({ "success": false, "error": format!("{category}: {detail}") })
}
