//! Inference service client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use modelgate_common::{ChatMessage, GenerationParams};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Client for the upstream inference service.
pub struct InferenceClient {
    http_client: Client,
    base_url: String,
}

// ============================================================================
// Upstream API types
// ============================================================================

/// POST /api/chat request body.
#[derive(Debug, Serialize)]
pub struct UpstreamChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(flatten)]
    pub params: GenerationParams,
}

/// POST /api/compare request body. Parameters go upstream verbatim; the
/// service fans the request out across the models itself.
#[derive(Debug, Serialize)]
pub struct UpstreamCompareRequest {
    pub models: Vec<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(flatten)]
    pub params: GenerationParams,
}

/// One entry of the upstream `/api/tags` listing. Names may be short
/// (no org prefix).
#[derive(Debug, Clone, Deserialize)]
pub struct LoadedModel {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<LoadedModel>,
}

// ============================================================================
// Client implementation
// ============================================================================

impl InferenceClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, None)
    }

    /// `timeout` bounds each upstream request end-to-end, including the
    /// streamed body. Streaming generations can run for minutes, so no
    /// timeout is applied unless one is configured.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            http_client: builder.build().expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST /api/chat. Returns the raw response so the caller can stream
    /// the body (`stream: true`) or decode a single JSON object.
    pub async fn chat(&self, request: &UpstreamChatRequest) -> Result<reqwest::Response> {
        self.post_json("/api/chat", request).await
    }

    /// POST /api/compare. The response body is an event stream that is
    /// relayed verbatim.
    pub async fn compare(&self, request: &UpstreamCompareRequest) -> Result<reqwest::Response> {
        self.post_json("/api/compare", request).await
    }

    /// GET /api/tags - models currently loaded by the inference service.
    pub async fn list_models(&self) -> Result<Vec<LoadedModel>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamStatus { status, body });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| Error::StreamParse(e.to_string()))?;

        Ok(tags.models)
    }

    async fn post_json<T: Serialize>(&self, path: &str, request: &T) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("Sending request to inference service: {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamStatus { status, body });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelgate_common::MessageContent;

    #[test]
    fn test_base_url_normalization() {
        let client = InferenceClient::new("http://localhost:8000/");
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_chat_request_serialization_skips_unset_params() {
        let request = UpstreamChatRequest {
            model: "m1".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Text("Hi".to_string()),
            }],
            stream: true,
            params: GenerationParams {
                temperature: Some(0.7),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m1");
        assert_eq!(json["stream"], true);
        assert_eq!(json["temperature"], 0.7);
        assert!(json.get("top_p").is_none());
        assert!(json.get("prompt_format").is_none());
    }

    #[test]
    fn test_loaded_model_deserialization() {
        let json = r#"{
            "name": "Qwen2-VL-7B-Instruct",
            "size": 16900000000,
            "modified_at": "2024-11-02T17:41:05.123456789Z"
        }"#;
        let model: LoadedModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.name, "Qwen2-VL-7B-Instruct");
        assert_eq!(model.size, Some(16_900_000_000));
        assert!(model.modified_at.is_some());
    }
}
