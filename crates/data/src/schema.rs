use serde::{Deserialize, Serialize};

pub use card_injector_core::{
    CardManifest, CharacterCards, EngineConfig, ItemManifest, ItemRecord, NodeSnapshot,
};

/// Persisted toggle written by the popup (`enable` / `disable`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Settings {
    /// Absent means enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }
}

/// Item record as scraped from the shop page, with its equip-slot icon
/// still inlined as markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedItem {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub equip_slot_svg: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub local_image: Option<String>,
}
