//! Per-request relay orchestration.

use bytes::Bytes;
use futures_util::{pin_mut, Stream, StreamExt};
use modelgate_common::ChatStreamChunk;
use serde::Deserialize;
use uuid::Uuid;

use super::frame::{FrameParser, WireEvent};
use super::sink::{DownstreamSink, SseFrame};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// `[DONE]` sentinel consumed, or the upstream body closed.
    Done,
    /// Upstream failed mid-stream, or the first chat payload was malformed.
    Errored,
    /// A downstream write failed: the client went away. Reported to no
    /// one; the upstream read stops immediately.
    ClientDisconnected,
}

/// Chat chunk as produced by the inference service (the subset the relay
/// needs; everything else is dropped during normalization).
#[derive(Debug, Deserialize)]
struct UpstreamChatChunk {
    #[serde(default)]
    model: Option<String>,
    message: UpstreamChunkMessage,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    total_duration: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UpstreamChunkMessage {
    #[serde(default)]
    content: String,
}

/// Running totals for the single-model path, reported when the session
/// completes.
#[derive(Debug)]
struct ChatState {
    model: String,
    chunks_relayed: u64,
    content_bytes: usize,
    total_duration: Option<u64>,
    eval_count: Option<u64>,
}

impl ChatState {
    fn observe(&mut self, chunk: &UpstreamChatChunk) {
        self.chunks_relayed += 1;
        self.content_bytes += chunk.message.content.len();
        if chunk.total_duration.is_some() {
            self.total_duration = chunk.total_duration;
        }
        if chunk.eval_count.is_some() {
            self.eval_count = chunk.eval_count;
        }
    }
}

enum Transform {
    /// Decode upstream chunks, re-emit normalized `{content, done, model}`
    /// payloads under `event: message`.
    Chat(ChatState),
    /// Forward `event:`/`data:` pairs verbatim. Payloads embed their own
    /// per-model attribution and are never decoded here.
    Compare,
}

enum Action {
    Send(SseFrame),
    Skip,
    /// Best-effort error frame, then end the session as `Errored`.
    Fail(SseFrame),
}

enum StepError {
    Disconnected,
    Fatal,
}

/// Orchestrates one client-facing streaming request: upstream bytes in,
/// transformed SSE frames out.
///
/// Events reach the sink strictly in upstream decode order. The sink is
/// bounded, so a stalled client suspends the upstream read instead of
/// queueing events (natural backpressure). Returning from [`run`] drops the
/// upstream body, which aborts the connection; a failed downstream write
/// therefore cancels upstream work within one scheduler tick.
///
/// [`run`]: RelaySession::run
pub struct RelaySession<S: DownstreamSink> {
    parser: FrameParser,
    sink: S,
    transform: Transform,
    session_id: Uuid,
}

impl<S: DownstreamSink> RelaySession<S> {
    /// Single-model chat session. `model` is the requested model id, used
    /// for attribution when an upstream chunk omits its own.
    pub fn chat(model: &str, sink: S) -> Self {
        Self {
            parser: FrameParser::new("message"),
            sink,
            transform: Transform::Chat(ChatState {
                model: model.to_string(),
                chunks_relayed: 0,
                content_bytes: 0,
                total_duration: None,
                eval_count: None,
            }),
            session_id: Uuid::new_v4(),
        }
    }

    /// Compare session: pass-through re-framing across multiple models.
    pub fn compare(sink: S) -> Self {
        Self {
            parser: FrameParser::new("chunk"),
            sink,
            transform: Transform::Compare,
            session_id: Uuid::new_v4(),
        }
    }

    /// Drive the upstream body to completion, terminal sentinel or client
    /// disconnect, whichever comes first.
    pub async fn run<B, E>(mut self, body: B) -> SessionOutcome
    where
        B: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        pin_mut!(body);
        while let Some(next) = body.next().await {
            let chunk = match next {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::warn!(session = %self.session_id, "Upstream stream failed: {}", e);
                    let _ = self
                        .sink
                        .send(SseFrame::error(&format!("upstream stream failed: {}", e)))
                        .await;
                    return SessionOutcome::Errored;
                }
            };

            for event in self.parser.push(&chunk) {
                match self.forward(event).await {
                    Ok(()) => {}
                    Err(StepError::Disconnected) => {
                        tracing::debug!(session = %self.session_id, "Client disconnected, aborting upstream read");
                        return SessionOutcome::ClientDisconnected;
                    }
                    Err(StepError::Fatal) => return SessionOutcome::Errored,
                }
            }

            if self.parser.finished() {
                // Sentinel consumed: stop reading even if upstream keeps
                // sending.
                self.log_completion();
                return SessionOutcome::Done;
            }
        }

        // Upstream closed without a sentinel. Chat clients still need a
        // terminator; compare payloads carry their own end-of-run events.
        if matches!(self.transform, Transform::Chat(_)) {
            if self.sink.send(SseFrame::done()).await.is_err() {
                return SessionOutcome::ClientDisconnected;
            }
        }
        self.log_completion();
        SessionOutcome::Done
    }

    async fn forward(&mut self, event: WireEvent) -> Result<(), StepError> {
        let action = match &mut self.transform {
            Transform::Compare => Action::Send(SseFrame::new(event.event, event.data)),
            Transform::Chat(state) => {
                if event.event == "done" {
                    Action::Send(SseFrame::done())
                } else {
                    match serde_json::from_str::<UpstreamChatChunk>(&event.data) {
                        Ok(chunk) => {
                            state.observe(&chunk);
                            let normalized = ChatStreamChunk {
                                content: chunk.message.content,
                                done: chunk.done,
                                model: chunk.model.unwrap_or_else(|| state.model.clone()),
                            };
                            Action::Send(SseFrame::new(
                                "message",
                                serde_json::to_string(&normalized).unwrap_or_default(),
                            ))
                        }
                        Err(e) if state.chunks_relayed == 0 => {
                            tracing::warn!(
                                session = %self.session_id,
                                "Malformed first chat payload: {}",
                                e
                            );
                            Action::Fail(SseFrame::error(&format!(
                                "malformed stream payload: {}",
                                e
                            )))
                        }
                        Err(e) => {
                            // Content already started flowing; drop the bad
                            // chunk and keep the stream alive.
                            tracing::warn!(
                                session = %self.session_id,
                                "Skipping malformed chat payload: {}",
                                e
                            );
                            Action::Skip
                        }
                    }
                }
            }
        };

        match action {
            Action::Skip => Ok(()),
            Action::Send(frame) => self
                .sink
                .send(frame)
                .await
                .map_err(|_| StepError::Disconnected),
            Action::Fail(frame) => {
                let _ = self.sink.send(frame).await;
                Err(StepError::Fatal)
            }
        }
    }

    fn log_completion(&self) {
        match &self.transform {
            Transform::Chat(state) => {
                tracing::debug!(
                    session = %self.session_id,
                    model = %state.model,
                    chunks = state.chunks_relayed,
                    content_bytes = state.content_bytes,
                    duration = ?state.total_duration,
                    tokens = ?state.eval_count,
                    "Chat relay complete"
                );
            }
            Transform::Compare => {
                tracing::debug!(session = %self.session_id, "Compare relay complete");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use futures_util::stream;

    use super::*;
    use crate::relay::SinkClosed;

    /// Records frames; optionally starts failing after a fixed number of
    /// accepted writes, like a client that went away mid-stream.
    #[derive(Clone, Default)]
    struct RecordingSink {
        frames: Arc<Mutex<Vec<SseFrame>>>,
        fail_after: Option<usize>,
    }

    impl RecordingSink {
        fn failing_after(fail_after: usize) -> Self {
            Self {
                frames: Arc::default(),
                fail_after: Some(fail_after),
            }
        }

        fn frames(&self) -> Vec<SseFrame> {
            self.frames.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DownstreamSink for RecordingSink {
        async fn send(&mut self, frame: SseFrame) -> Result<(), SinkClosed> {
            let mut frames = self.frames.lock().unwrap();
            if let Some(limit) = self.fail_after {
                if frames.len() >= limit {
                    return Err(SinkClosed);
                }
            }
            frames.push(frame);
            Ok(())
        }
    }

    fn body_of(chunks: Vec<&str>) -> impl Stream<Item = Result<Bytes, String>> + Unpin {
        stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::copy_from_slice(c.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_chat_normalization_end_to_end() {
        let sink = RecordingSink::default();
        let session = RelaySession::chat("m1", sink.clone());

        let body = body_of(vec![
            "data: {\"model\":\"m1\",\"message\":{\"content\":\"Hi\"},\"done\":false}\n\n",
            "data: {\"model\":\"m1\",\"message\":{\"content\":\"\"},\"done\":true}\n\n",
            "data: [DONE]\n\n",
        ]);

        let outcome = session.run(body).await;
        assert_eq!(outcome, SessionOutcome::Done);
        assert_eq!(
            sink.frames(),
            vec![
                SseFrame::new("message", r#"{"content":"Hi","done":false,"model":"m1"}"#),
                SseFrame::new("message", r#"{"content":"","done":true,"model":"m1"}"#),
                SseFrame::done(),
            ]
        );
    }

    #[tokio::test]
    async fn test_chat_model_attribution_fallback() {
        let sink = RecordingSink::default();
        let session = RelaySession::chat("requested-model", sink.clone());

        let body = body_of(vec![
            "data: {\"message\":{\"content\":\"x\"},\"done\":false}\n\n",
            "data: [DONE]\n\n",
        ]);

        assert_eq!(session.run(body).await, SessionOutcome::Done);
        let frames = sink.frames();
        assert!(frames[0].data.contains(r#""model":"requested-model""#));
    }

    #[tokio::test]
    async fn test_sentinel_stops_consuming_input() {
        let sink = RecordingSink::default();
        let session = RelaySession::chat("m1", sink.clone());

        // More data follows the sentinel, both in the same chunk and in a
        // later one; none of it may surface downstream.
        let body = body_of(vec![
            "data: [DONE]\n\ndata: {\"message\":{\"content\":\"late\"},\"done\":false}\n\n",
            "data: {\"message\":{\"content\":\"later\"},\"done\":false}\n\n",
        ]);

        assert_eq!(session.run(body).await, SessionOutcome::Done);
        assert_eq!(sink.frames(), vec![SseFrame::done()]);
    }

    #[tokio::test]
    async fn test_malformed_first_payload_is_fatal() {
        let sink = RecordingSink::default();
        let session = RelaySession::chat("m1", sink.clone());

        let body = body_of(vec!["data: {not json}\n\n", "data: [DONE]\n\n"]);

        assert_eq!(session.run(body).await, SessionOutcome::Errored);
        let frames = sink.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "error");
    }

    #[tokio::test]
    async fn test_malformed_payload_mid_stream_is_skipped() {
        let sink = RecordingSink::default();
        let session = RelaySession::chat("m1", sink.clone());

        let body = body_of(vec![
            "data: {\"model\":\"m1\",\"message\":{\"content\":\"a\"},\"done\":false}\n\n",
            "data: {not json}\n\n",
            "data: {\"model\":\"m1\",\"message\":{\"content\":\"b\"},\"done\":false}\n\n",
            "data: [DONE]\n\n",
        ]);

        assert_eq!(session.run(body).await, SessionOutcome::Done);
        let frames = sink.frames();
        assert_eq!(frames.len(), 3);
        assert!(frames[0].data.contains("\"a\""));
        assert!(frames[1].data.contains("\"b\""));
        assert_eq!(frames[2], SseFrame::done());
    }

    #[tokio::test]
    async fn test_chat_upstream_close_without_sentinel_emits_done() {
        let sink = RecordingSink::default();
        let session = RelaySession::chat("m1", sink.clone());

        let body = body_of(vec![
            "data: {\"model\":\"m1\",\"message\":{\"content\":\"a\"},\"done\":false}\n\n",
        ]);

        assert_eq!(session.run(body).await, SessionOutcome::Done);
        let frames = sink.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], SseFrame::done());
    }

    #[tokio::test]
    async fn test_compare_pass_through_is_verbatim() {
        let sink = RecordingSink::default();
        let session = RelaySession::compare(sink.clone());

        // Deliberately odd payload formatting: key order, spacing and
        // number formatting must survive untouched.
        let body = body_of(vec![
            "event: chunk\ndata: {\"model\":\"m2\",  \"content\":\"Hi\"}\n\n",
            "event: model_done\ndata: {\"totalDuration\": 1.50, \"model\": \"m2\"}\n\n",
            "data: {\"fullContent\":\"Hi\"}\n\n",
            "event: all_done\ndata: {}\n\n",
        ]);

        assert_eq!(session.run(body).await, SessionOutcome::Done);
        assert_eq!(
            sink.frames(),
            vec![
                SseFrame::new("chunk", "{\"model\":\"m2\",  \"content\":\"Hi\"}"),
                SseFrame::new("model_done", "{\"totalDuration\": 1.50, \"model\": \"m2\"}"),
                SseFrame::new("chunk", "{\"fullContent\":\"Hi\"}"),
                SseFrame::new("all_done", "{}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_compare_close_without_sentinel_adds_nothing() {
        let sink = RecordingSink::default();
        let session = RelaySession::compare(sink.clone());

        let body = body_of(vec!["event: chunk\ndata: {\"model\":\"m1\"}\n\n"]);

        assert_eq!(session.run(body).await, SessionOutcome::Done);
        assert_eq!(sink.frames().len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_error_mid_stream() {
        let sink = RecordingSink::default();
        let session = RelaySession::chat("m1", sink.clone());

        let chunks: Vec<Result<Bytes, String>> = vec![
            Ok(Bytes::from_static(
                b"data: {\"model\":\"m1\",\"message\":{\"content\":\"a\"},\"done\":false}\n\n",
            )),
            Err("connection reset".to_string()),
        ];

        let outcome = session.run(stream::iter(chunks)).await;
        assert_eq!(outcome, SessionOutcome::Errored);
        let frames = sink.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].event, "error");
        assert!(frames[1].data.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_client_disconnect_aborts_upstream_read() {
        let sink = RecordingSink::failing_after(2);
        let session = RelaySession::chat("m1", sink.clone());

        let chunks_pulled = Arc::new(AtomicUsize::new(0));
        let counter = chunks_pulled.clone();

        // Ten chunks, one event each; the sink accepts two writes.
        let chunks: Vec<Result<Bytes, String>> = (0..10)
            .map(|i| {
                Ok(Bytes::from(format!(
                    "data: {{\"model\":\"m1\",\"message\":{{\"content\":\"{}\"}},\"done\":false}}\n\n",
                    i
                )))
            })
            .collect();
        let body = Box::pin(stream::iter(chunks).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let outcome = session.run(body).await;
        assert_eq!(outcome, SessionOutcome::ClientDisconnected);

        // Two frames made it out, the write of the third failed, and the
        // upstream read stopped right there instead of draining all ten
        // chunks.
        assert_eq!(sink.frames().len(), 2);
        assert_eq!(chunks_pulled.load(Ordering::SeqCst), 3);
    }
}
