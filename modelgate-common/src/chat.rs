//! Chat wire types shared between the gateway and browser clients.

use serde::{Deserialize, Serialize};

/// Single-model chat request as sent by the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    /// Whether to stream the response. Defaults to streaming.
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub params: GenerationParams,
}

/// Compare request: one shared conversation fanned out across several models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub models: Vec<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(flatten)]
    pub params: GenerationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

/// Message content is either a bare string or an ordered list of parts.
/// Part order is preserved as received; the gateway never reorders it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    /// Image reference: a URL or an embedded data-URI.
    Image { url: String },
}

/// Client-tunable generation parameters.
///
/// All fields are optional on input; unset fields fall back to the model's
/// preset before the request goes upstream. `prompt_format` is always taken
/// from the preset, never from the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_minimal() {
        let json = r#"{"messages": [{"role": "user", "content": "Hello"}]}"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert!(req.model.is_none());
        assert!(req.stream.is_none());
        assert_eq!(req.messages.len(), 1);
        assert!(req.params.temperature.is_none());
    }

    #[test]
    fn test_chat_request_flattened_params() {
        let json = r#"{
            "model": "Qwen/Qwen2.5-7B-Instruct",
            "messages": [{"role": "user", "content": "Hello"}],
            "temperature": 0.2,
            "max_tokens": 512
        }"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.model.as_deref(), Some("Qwen/Qwen2.5-7B-Instruct"));
        assert_eq!(req.params.temperature, Some(0.2));
        assert_eq!(req.params.max_tokens, Some(512));
        assert!(req.params.top_p.is_none());
    }

    #[test]
    fn test_message_content_plain_text() {
        let json = r#"{"role": "user", "content": "Hi there"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        match msg.content {
            MessageContent::Text(ref t) => assert_eq!(t, "Hi there"),
            MessageContent::Parts(_) => panic!("expected plain text content"),
        }
    }

    #[test]
    fn test_message_content_parts_preserve_order() {
        let json = r#"{
            "role": "user",
            "content": [
                {"type": "image", "url": "data:image/png;base64,AAAA"},
                {"type": "text", "text": "what is this?"},
                {"type": "image", "url": "https://example.com/b.png"}
            ]
        }"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        let parts = match msg.content {
            MessageContent::Parts(p) => p,
            MessageContent::Text(_) => panic!("expected content parts"),
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[0], ContentPart::Image { .. }));
        assert!(matches!(parts[1], ContentPart::Text { .. }));
        assert!(matches!(parts[2], ContentPart::Image { .. }));

        // Round-trip keeps the wire order untouched.
        let out = serde_json::to_value(&parts).unwrap();
        assert_eq!(out[0]["type"], "image");
        assert_eq!(out[1]["text"], "what is this?");
        assert_eq!(out[2]["url"], "https://example.com/b.png");
    }

    #[test]
    fn test_compare_request() {
        let json = r#"{
            "models": ["m1", "m2"],
            "messages": [{"role": "user", "content": "Hello"}],
            "top_p": 0.9
        }"#;
        let req: CompareRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.models, vec!["m1", "m2"]);
        assert_eq!(req.params.top_p, Some(0.9));
    }

    #[test]
    fn test_generation_params_skip_unset_on_serialize() {
        let params = GenerationParams {
            temperature: Some(0.7),
            ..Default::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"temperature":0.7}"#);
    }
}
