//! Model directory assembly: upstream-loaded models merged with presets.

use chrono::{DateTime, Utc};
use modelgate_common::{short_name, Preset};
use serde::Serialize;

use crate::presets::PresetTable;
use crate::upstream::LoadedModel;

/// One row of the unified model directory.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    pub loaded: bool,
    /// The resolved preset, or `None` when resolution degraded to the
    /// category default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
}

/// Merge the upstream "currently loaded" listing with a preset table.
///
/// Loaded models come first, in upstream-reported order, each with its
/// resolved preset attached. Preset entries not already represented follow
/// in table order as "available but not loaded". Duplicate suppression is
/// by short-name equality: loaded listings may report only the short model
/// name.
pub fn merge(loaded: &[LoadedModel], table: &PresetTable) -> Vec<DirectoryEntry> {
    let mut entries: Vec<DirectoryEntry> = loaded
        .iter()
        .map(|model| {
            let preset = table.resolve(&model.name);
            DirectoryEntry {
                name: model.name.clone(),
                size: model.size,
                modified_at: model.modified_at,
                loaded: true,
                preset: if preset.is_default() {
                    None
                } else {
                    Some(preset.clone())
                },
            }
        })
        .collect();

    for (key, preset) in table.entries() {
        let represented = loaded
            .iter()
            .any(|model| model.name == key || short_name(&model.name) == short_name(key));
        if !represented {
            entries.push(DirectoryEntry {
                name: key.to_string(),
                size: None,
                modified_at: None,
                loaded: false,
                preset: Some(preset.clone()),
            });
        }
    }

    entries
}
