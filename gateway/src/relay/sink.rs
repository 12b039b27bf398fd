//! Downstream SSE write abstraction.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::response::sse::Event;
use modelgate_common::{StreamError, DONE_SENTINEL};
use tokio::sync::mpsc;

/// One downstream SSE event: event name plus data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

impl SseFrame {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }

    /// The terminal frame: `event: done` / `data: [DONE]`.
    pub fn done() -> Self {
        Self::new("done", DONE_SENTINEL)
    }

    /// A terminal failure frame: `event: error` / `data: {"error": ...}`.
    pub fn error(message: &str) -> Self {
        let payload = StreamError {
            error: message.to_string(),
        };
        Self::new(
            "error",
            serde_json::to_string(&payload).unwrap_or_default(),
        )
    }
}

/// The client connection is gone; no further writes will succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

/// Write side of one client-facing event stream.
///
/// Implementations flush each frame as it is written and report a closed
/// client as [`SinkClosed`]; the relay stops on the first failed write.
#[async_trait]
pub trait DownstreamSink: Send {
    async fn send(&mut self, frame: SseFrame) -> Result<(), SinkClosed>;
}

/// Bridges the relay to an axum SSE response through a bounded channel.
///
/// Capacity 1 keeps at most one event in flight: when the client stalls,
/// the relay suspends here, which in turn suspends the upstream read. A
/// dropped receiver (axum tore down the response body) means the client
/// disconnected.
pub struct ChannelSink {
    tx: mpsc::Sender<Result<Event, Infallible>>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::Receiver<Result<Event, Infallible>>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl DownstreamSink for ChannelSink {
    async fn send(&mut self, frame: SseFrame) -> Result<(), SinkClosed> {
        let event = Event::default().event(frame.event).data(frame.data);
        self.tx.send(Ok(event)).await.map_err(|_| SinkClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_frame_payload() {
        let frame = SseFrame::error("boom");
        assert_eq!(frame.event, "error");
        assert_eq!(frame.data, r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_done_frame() {
        let frame = SseFrame::done();
        assert_eq!(frame.event, "done");
        assert_eq!(frame.data, "[DONE]");
    }

    #[tokio::test]
    async fn test_channel_sink_reports_dropped_receiver() {
        let (mut sink, rx) = ChannelSink::channel();
        drop(rx);
        assert_eq!(sink.send(SseFrame::done()).await, Err(SinkClosed));
    }
}
