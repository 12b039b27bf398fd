//! Preset tables and the model-id resolution chain.
//!
//! Tables are built once at startup into an immutable [`PresetCatalog`]
//! shared by reference across requests; there is no runtime mutation path.

mod tables;

use modelgate_common::{short_name, GenerationParams, ModelCategory, Preset};

/// An insertion-ordered preset table for one model category.
///
/// Entries are kept as a vector of `(key, preset)` pairs rather than a map:
/// the short-name fallback scan returns the *first* match, so iteration
/// order is part of the contract and must stay the insertion order of the
/// static table.
#[derive(Debug, Clone)]
pub struct PresetTable {
    entries: Vec<(String, Preset)>,
    default: Preset,
}

impl PresetTable {
    pub fn new(entries: Vec<(String, Preset)>, default: Preset) -> Self {
        Self { entries, default }
    }

    /// Resolve a model id to a preset. Never fails: an unknown id degrades
    /// to the category default.
    ///
    /// Match order, first hit wins:
    /// 1. exact key match;
    /// 2. first entry (in table order) whose key contains the short name of
    ///    `model_id` (the part after the last `/`);
    /// 3. the category default.
    pub fn resolve(&self, model_id: &str) -> &Preset {
        if let Some((_, preset)) = self.entries.iter().find(|(key, _)| key == model_id) {
            return preset;
        }

        let short = short_name(model_id);
        if !short.is_empty() {
            if let Some((_, preset)) = self.entries.iter().find(|(key, _)| key.contains(short)) {
                return preset;
            }
        }

        &self.default
    }

    /// Table entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Preset)> {
        self.entries.iter().map(|(key, preset)| (key.as_str(), preset))
    }

    pub fn default_preset(&self) -> &Preset {
        &self.default
    }
}

/// All five category tables, built once at startup.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    pub llm: PresetTable,
    pub image: PresetTable,
    pub image_to_image: PresetTable,
    pub image_to_3d: PresetTable,
    pub video: PresetTable,
}

impl PresetCatalog {
    /// The built-in static tables.
    pub fn builtin() -> Self {
        tables::builtin()
    }

    pub fn table(&self, category: ModelCategory) -> &PresetTable {
        match category {
            ModelCategory::Llm => &self.llm,
            ModelCategory::Image => &self.image,
            ModelCategory::ImageToImage => &self.image_to_image,
            ModelCategory::ImageTo3d => &self.image_to_3d,
            ModelCategory::Video => &self.video,
        }
    }
}

/// Merge client-supplied parameters with a resolved preset.
///
/// Client values override preset defaults; unset fields fall back to the
/// preset. `prompt_format` is always the preset's, never the client's.
pub fn merge_params(client: &GenerationParams, preset: &Preset) -> GenerationParams {
    GenerationParams {
        temperature: client.temperature.or(preset.defaults.temperature),
        top_p: client.top_p.or(preset.defaults.top_p),
        top_k: client.top_k.or(preset.defaults.top_k),
        max_tokens: client.max_tokens.or(preset.defaults.max_tokens),
        prompt_format: preset.defaults.prompt_format.clone(),
    }
}
