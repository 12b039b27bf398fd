//! Generation preset records.
//!
//! A preset bundles the default generation parameters, UI bounds and
//! capability flags for one model. Presets are keyed by HuggingFace-style
//! `org/name` identifiers and grouped into independent per-category tables
//! on the gateway side. The record itself is a plain wire type: the model
//! directory endpoint serves it to clients as-is.

use serde::{Deserialize, Serialize};

use crate::chat::GenerationParams;

/// The five independent preset categories. Each has its own table and its
/// own default preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCategory {
    Llm,
    Image,
    ImageToImage,
    ImageTo3d,
    Video,
}

/// Generation defaults, UI bounds and capability flags for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    /// Model identifier, or the literal `"default"` for a category default.
    pub model_id: String,
    pub category: ModelCategory,
    /// Defaults applied to parameters the client leaves unset.
    pub defaults: GenerationParams,
    /// UI slider bounds; absent for categories without tunable sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<ParamBounds>,
    pub supports_system_prompt: bool,
    pub supports_vision: bool,
}

/// Client-side UI bounds for the tunable generation parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParamBounds {
    pub min_temperature: f32,
    pub max_temperature: f32,
    pub min_top_p: f32,
    pub max_top_p: f32,
    pub max_tokens_limit: u32,
}

impl Preset {
    /// Whether this is a category default rather than a per-model entry.
    pub fn is_default(&self) -> bool {
        self.model_id == "default"
    }
}

/// The portion of a model id after the last `/`, or the whole id if it has
/// no org prefix. Upstream "loaded" listings may report only this part.
pub fn short_name(model_id: &str) -> &str {
    match model_id.rsplit_once('/') {
        Some((_, short)) => short,
        None => model_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(
            short_name("Qwen/Qwen2-VL-7B-Instruct"),
            "Qwen2-VL-7B-Instruct"
        );
        assert_eq!(short_name("Qwen2-VL-7B-Instruct"), "Qwen2-VL-7B-Instruct");
        assert_eq!(short_name("a/b/c"), "c");
        assert_eq!(short_name(""), "");
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&ModelCategory::ImageToImage).unwrap(),
            r#""image_to_image""#
        );
        let cat: ModelCategory = serde_json::from_str(r#""llm""#).unwrap();
        assert_eq!(cat, ModelCategory::Llm);
    }

    #[test]
    fn test_is_default() {
        let preset = Preset {
            model_id: "default".to_string(),
            category: ModelCategory::Llm,
            defaults: GenerationParams::default(),
            bounds: None,
            supports_system_prompt: true,
            supports_vision: false,
        };
        assert!(preset.is_default());
    }
}
