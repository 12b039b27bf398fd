//! Multi-model compare relay endpoint.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::Sse;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use modelgate_common::CompareRequest;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{Error, Result};
use crate::relay::{ChannelSink, DownstreamSink, RelaySession};
use crate::upstream::UpstreamCompareRequest;
use crate::AppState;

/// Upper bound on the compare fan-out.
const MAX_COMPARE_MODELS: usize = 5;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/compare", post(compare))
        .with_state(state)
}

/// POST /api/compare - one shared conversation fanned out across several
/// models, relayed as an SSE pass-through.
async fn compare(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CompareRequest>,
) -> Result<Response> {
    if request.models.is_empty() {
        return Err(Error::InvalidRequest(
            "at least one model is required".to_string(),
        ));
    }
    if request.models.len() > MAX_COMPARE_MODELS {
        return Err(Error::InvalidRequest(format!(
            "at most {} models can be compared",
            MAX_COMPARE_MODELS
        )));
    }
    let distinct: HashSet<&str> = request.models.iter().map(String::as_str).collect();
    if distinct.len() != request.models.len() {
        return Err(Error::InvalidRequest(
            "models must be distinct".to_string(),
        ));
    }
    if request.messages.is_empty() {
        return Err(Error::InvalidRequest(
            "messages must not be empty".to_string(),
        ));
    }

    // Presets are deliberately not applied here: the upstream fans the
    // request out itself and expects the shared parameters verbatim.
    let mut params = request.params;
    params.prompt_format = None;

    let upstream_request = UpstreamCompareRequest {
        models: request.models,
        messages: request.messages,
        params,
    };

    let (sink, rx) = ChannelSink::channel();
    tokio::spawn(run_compare_relay(state, upstream_request, sink));

    Ok(Sse::new(ReceiverStream::new(rx)).into_response())
}

/// Opens the upstream compare stream and drives the pass-through relay.
async fn run_compare_relay(
    state: Arc<AppState>,
    request: UpstreamCompareRequest,
    mut sink: ChannelSink,
) {
    let models = request.models.join(",");
    let response = match state.upstream.compare(&request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Compare relay for [{}] failed to open upstream: {}", models, e);
            let _ = sink.send(e.to_sse_frame()).await;
            return;
        }
    };

    let outcome = RelaySession::compare(sink)
        .run(response.bytes_stream())
        .await;
    tracing::debug!("Compare relay for [{}] finished: {:?}", models, outcome);
}
