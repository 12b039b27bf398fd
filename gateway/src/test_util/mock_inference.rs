//! Builders for fake inference-service responses used in tests.

use modelgate_common::DONE_SENTINEL;
use serde_json::json;

/// One streamed chat chunk in the upstream wire shape.
pub fn chat_chunk(model: &str, content: &str, done: bool) -> serde_json::Value {
    json!({
        "model": model,
        "message": { "content": content },
        "done": done
    })
}

/// The closing chat chunk carrying run statistics.
pub fn final_chat_chunk(model: &str, total_duration: u64, eval_count: u64) -> serde_json::Value {
    json!({
        "model": model,
        "message": { "content": "" },
        "done": true,
        "total_duration": total_duration,
        "eval_count": eval_count
    })
}

/// A non-streaming chat response body.
pub fn chat_response(model: &str, content: &str) -> serde_json::Value {
    json!({
        "model": model,
        "message": { "role": "assistant", "content": content },
        "done": true
    })
}

/// An `/api/tags` listing.
pub fn tags_response(names: &[&str]) -> serde_json::Value {
    json!({
        "models": names
            .iter()
            .map(|name| json!({
                "name": name,
                "size": 4_000_000_000u64,
                "modified_at": "2024-11-02T17:41:05Z"
            }))
            .collect::<Vec<_>>()
    })
}

/// Assemble an SSE body of bare `data:` lines terminated by the sentinel.
pub fn sse_chat_body(chunks: &[serde_json::Value]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str(&format!("data: {}\n\n", DONE_SENTINEL));
    body
}

/// Assemble an SSE body of explicit `event:`/`data:` pairs, without a
/// terminating sentinel (compare streams signal completion in-band).
pub fn sse_event_body(events: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (event, data) in events {
        body.push_str(&format!("event: {}\ndata: {}\n\n", event, data));
    }
    body
}
