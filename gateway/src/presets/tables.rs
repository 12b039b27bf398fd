//! Built-in preset tables.
//!
//! Entry order matters: the short-name fallback in
//! [`PresetTable::resolve`](super::PresetTable::resolve) returns the first
//! match in table order.

use modelgate_common::{GenerationParams, ModelCategory, ParamBounds, Preset};

use super::{PresetCatalog, PresetTable};

const LLM_BOUNDS: ParamBounds = ParamBounds {
    min_temperature: 0.0,
    max_temperature: 2.0,
    min_top_p: 0.0,
    max_top_p: 1.0,
    max_tokens_limit: 8192,
};

fn llm(model_id: &str, prompt_format: &str) -> Preset {
    Preset {
        model_id: model_id.to_string(),
        category: ModelCategory::Llm,
        defaults: GenerationParams {
            temperature: Some(0.7),
            top_p: Some(0.9),
            top_k: Some(40),
            max_tokens: Some(2048),
            prompt_format: Some(prompt_format.to_string()),
        },
        bounds: Some(LLM_BOUNDS),
        supports_system_prompt: true,
        supports_vision: false,
    }
}

fn media(model_id: &str, category: ModelCategory) -> Preset {
    Preset {
        model_id: model_id.to_string(),
        category,
        defaults: GenerationParams::default(),
        bounds: None,
        supports_system_prompt: false,
        supports_vision: false,
    }
}

fn entry(preset: Preset) -> (String, Preset) {
    (preset.model_id.clone(), preset)
}

pub(super) fn builtin() -> PresetCatalog {
    let mut llama = llm("meta-llama/Llama-3.1-8B-Instruct", "llama3");
    llama.defaults.temperature = Some(0.6);

    let llm_table = PresetTable::new(
        vec![
            entry(Preset {
                supports_vision: true,
                ..llm("Qwen/Qwen2-VL-7B-Instruct", "qwen2-vl")
            }),
            entry(llm("Qwen/Qwen2.5-7B-Instruct", "chatml")),
            entry(llama),
            entry(Preset {
                supports_system_prompt: false,
                ..llm("mistralai/Mistral-7B-Instruct-v0.3", "mistral")
            }),
            entry(Preset {
                supports_system_prompt: false,
                ..llm("google/gemma-2-9b-it", "gemma")
            }),
        ],
        llm("default", "chatml"),
    );

    let image_table = PresetTable::new(
        vec![
            entry(media(
                "stabilityai/stable-diffusion-xl-base-1.0",
                ModelCategory::Image,
            )),
            entry(media("black-forest-labs/FLUX.1-schnell", ModelCategory::Image)),
        ],
        media("default", ModelCategory::Image),
    );

    let image_to_image_table = PresetTable::new(
        vec![entry(media(
            "timbrooks/instruct-pix2pix",
            ModelCategory::ImageToImage,
        ))],
        media("default", ModelCategory::ImageToImage),
    );

    let image_to_3d_table = PresetTable::new(
        vec![entry(media("stabilityai/TripoSR", ModelCategory::ImageTo3d))],
        media("default", ModelCategory::ImageTo3d),
    );

    let video_table = PresetTable::new(
        vec![entry(media("THUDM/CogVideoX-2b", ModelCategory::Video))],
        media("default", ModelCategory::Video),
    );

    PresetCatalog {
        llm: llm_table,
        image: image_table,
        image_to_image: image_to_image_table,
        image_to_3d: image_to_3d_table,
        video: video_table,
    }
}
