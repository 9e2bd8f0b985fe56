use serde::{Deserialize, Serialize};

pub const DEFAULT_ASSET_HOST: &str =
    "https://raw.githubusercontent.com/jeembob/Room-Mavens/main/images";
pub const DEFAULT_ABILITY_SOURCE_FRAGMENT: &str = "/public/images/byid/";
pub const DEFAULT_OVERLAY_CLASS: &str = "injected-item-label";
pub const DEFAULT_ITEM_MARK_ATTRIBUTE: &str = "data-injected-item-id";
pub const DEFAULT_ORIENTATION_ATTRIBUTE: &str = "data-injected-item-orientation";

/// Host-page contracts and tuning knobs. Every field has a default, so a
/// partial `config.json` only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub asset_host: String,
    pub ability_source_fragment: String,
    pub overlay_class: String,
    pub item_mark_attribute: String,
    pub orientation_attribute: String,
    pub max_fuzzy_distance: usize,
    pub max_settle_rounds: u32,
    pub ability_outline: String,
    pub item_outline: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_host: DEFAULT_ASSET_HOST.to_string(),
            ability_source_fragment: DEFAULT_ABILITY_SOURCE_FRAGMENT.to_string(),
            overlay_class: DEFAULT_OVERLAY_CLASS.to_string(),
            item_mark_attribute: DEFAULT_ITEM_MARK_ATTRIBUTE.to_string(),
            orientation_attribute: DEFAULT_ORIENTATION_ATTRIBUTE.to_string(),
            max_fuzzy_distance: 2,
            max_settle_rounds: 8,
            ability_outline: "3px solid magenta".to_string(),
            item_outline: "3px solid cyan".to_string(),
        }
    }
}

impl EngineConfig {
    /// `<host>/<character>/<card>.jpeg`
    pub fn asset_url(&self, character: &str, card: &str) -> String {
        format!(
            "{}/{}/{}.jpeg",
            self.asset_host.trim_end_matches('/'),
            character,
            card
        )
    }
}
