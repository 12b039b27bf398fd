//! Single-model chat relay endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::Sse;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use modelgate_common::ChatRequest;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{Error, Result};
use crate::presets::merge_params;
use crate::relay::{ChannelSink, DownstreamSink, RelaySession};
use crate::upstream::UpstreamChatRequest;
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .with_state(state)
}

/// POST /api/chat - single-model chat, streamed over SSE unless the client
/// asks for `stream: false`.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Response> {
    let model = request
        .model
        .clone()
        .ok_or_else(|| Error::InvalidRequest("model is required".to_string()))?;
    if request.messages.is_empty() {
        return Err(Error::InvalidRequest(
            "messages must not be empty".to_string(),
        ));
    }

    let preset = state.presets.llm.resolve(&model);
    let upstream_request = UpstreamChatRequest {
        model: model.clone(),
        messages: request.messages,
        stream: request.stream.unwrap_or(true),
        params: merge_params(&request.params, preset),
    };

    if !upstream_request.stream {
        // Non-streaming: a single upstream JSON object, passed through.
        let response = state.upstream.chat(&upstream_request).await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::StreamParse(e.to_string()))?;
        return Ok(Json(body).into_response());
    }

    let (sink, rx) = ChannelSink::channel();
    tokio::spawn(run_chat_relay(state, model, upstream_request, sink));

    Ok(Sse::new(ReceiverStream::new(rx)).into_response())
}

/// Opens the upstream stream and drives the relay to completion. Failures
/// here surface as a terminal `error` event: the response has already
/// committed to a streaming content type.
async fn run_chat_relay(
    state: Arc<AppState>,
    model: String,
    request: UpstreamChatRequest,
    mut sink: ChannelSink,
) {
    let response = match state.upstream.chat(&request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Chat relay for {} failed to open upstream: {}", model, e);
            let _ = sink.send(e.to_sse_frame()).await;
            return;
        }
    };

    let outcome = RelaySession::chat(&model, sink)
        .run(response.bytes_stream())
        .await;
    tracing::debug!("Chat relay for {} finished: {:?}", model, outcome);
}
