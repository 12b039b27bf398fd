//! Streaming event payloads emitted to clients.

use serde::{Deserialize, Serialize};

/// The out-of-band end-of-stream marker carried on the `data:` channel.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Normalized single-model chat chunk, carried as the `event: message` data
/// payload. Field order is part of the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    pub content: String,
    pub done: bool,
    pub model: String,
}

/// Terminal failure payload, carried as the `event: error` data payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamError {
    pub error: String,
}
