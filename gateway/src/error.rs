//! Error types for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::relay::SseFrame;

/// Failure taxonomy for gateway operations.
///
/// Client disconnects are deliberately not represented here: they are a
/// session outcome, silently cancel upstream work and are reported to no
/// one.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection refused or timed out before any upstream response.
    #[error("Inference service unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Upstream answered with a non-2xx status.
    #[error("Inference service returned {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    /// Malformed payload where JSON decoding is required.
    #[error("Malformed stream payload: {0}")]
    StreamParse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Terminal SSE frame for failures detected after the response has
    /// already committed to a streaming content type.
    pub fn to_sse_frame(&self) -> SseFrame {
        SseFrame::error(&self.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::UpstreamUnreachable(_) => (StatusCode::BAD_GATEWAY, "upstream_unreachable"),
            Error::UpstreamStatus { .. } => (StatusCode::BAD_GATEWAY, "upstream_error"),
            Error::StreamParse(_) => (StatusCode::BAD_GATEWAY, "stream_parse_error"),
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
