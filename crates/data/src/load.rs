use crate::schema::{CardManifest, EngineConfig, ItemManifest, NodeSnapshot, Settings};
use anyhow::Context;
use card_injector_core::{Document, FlagStore, InjectorError, ManifestSource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CARDS_FILE: &str = "cards.json";
pub const ITEMS_FILE: &str = "itemcards.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const CONFIG_FILE: &str = "config.json";

pub fn load_card_manifest(path: &Path) -> anyhow::Result<CardManifest> {
    load_json(path)
}

pub fn load_item_manifest(path: &Path) -> anyhow::Result<ItemManifest> {
    load_json(path)
}

/// `config.json` in `dir`, or defaults when the file does not exist.
pub fn load_engine_config(dir: &Path) -> anyhow::Result<EngineConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    load_json(path)
}

/// `settings.json` in `dir`; a missing file reads as "never toggled".
pub fn load_settings(dir: &Path) -> anyhow::Result<Settings> {
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(Settings::default());
    }
    load_json(path)
}

pub fn save_settings(dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    write_json(dir.join(SETTINGS_FILE), settings)
}

pub fn load_document(path: &Path) -> anyhow::Result<Document> {
    let snapshot: NodeSnapshot = load_json(path)?;
    Ok(Document::from_snapshot(&snapshot))
}

pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut body = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize {}", path.display()))?;
    body.push('\n');
    fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Bundled extension assets: manifests, settings and optional config in one
/// directory. Plays the flag-store and manifest-source roles for bootstrap.
#[derive(Debug, Clone)]
pub struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cards_path(&self) -> PathBuf {
        self.root.join(CARDS_FILE)
    }

    pub fn items_path(&self) -> PathBuf {
        self.root.join(ITEMS_FILE)
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        load_settings(&self.root)
    }

    pub fn config(&self) -> anyhow::Result<EngineConfig> {
        load_engine_config(&self.root)
    }
}

impl FlagStore for AssetDir {
    fn read_enabled(&self) -> Result<Option<bool>, InjectorError> {
        self.settings()
            .map(|settings| settings.enabled)
            .map_err(|err| InjectorError::Flag(format!("{err:#}")))
    }
}

impl ManifestSource for AssetDir {
    fn card_manifest(&self) -> Result<CardManifest, InjectorError> {
        load_card_manifest(&self.cards_path())
            .map_err(|err| InjectorError::CardManifest(format!("{err:#}")))
    }

    fn item_manifest(&self) -> Result<ItemManifest, InjectorError> {
        load_item_manifest(&self.items_path())
            .map_err(|err| InjectorError::ItemManifest(format!("{err:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    #[test]
    fn card_manifest_keeps_document_order() {
        let dir = unique_temp_dir();
        let path = dir.join(CARDS_FILE);
        fs::write(
            &path,
            r#"{"Tinkerer": ["ink-bomb"], "Brute": ["trample", "eye-for-an-eye"]}"#,
        )
        .expect("write");
        let manifest = load_card_manifest(&path).expect("load");
        let order: Vec<&str> = manifest
            .characters
            .iter()
            .map(|c| c.character.as_str())
            .collect();
        assert_eq!(order, vec!["Tinkerer", "Brute"]);
        assert_eq!(manifest.card_count(), 3);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn item_manifest_accepts_bare_array() {
        let dir = unique_temp_dir();
        let path = dir.join(ITEMS_FILE);
        fs::write(
            &path,
            r#"[{"name": "Boots", "cost": 20, "equip_slot": "legs",
                 "image_url": "https://h/public/images/byid/1.image.webp"}]"#,
        )
        .expect("write");
        let manifest = load_item_manifest(&path).expect("load");
        assert!(manifest.equip_slot_icons.is_empty());
        assert_eq!(manifest.items[0].cost.as_deref(), Some("20"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_settings_and_config_use_defaults() {
        let dir = unique_temp_dir();
        assert_eq!(load_settings(&dir).expect("settings"), Settings::default());
        assert_eq!(load_engine_config(&dir).expect("config"), EngineConfig::default());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn partial_config_overrides_named_fields() {
        let dir = unique_temp_dir();
        fs::write(dir.join(CONFIG_FILE), r#"{"max_fuzzy_distance": 1}"#).expect("write");
        let config = load_engine_config(&dir).expect("config");
        assert_eq!(config.max_fuzzy_distance, 1);
        assert_eq!(config.asset_host, EngineConfig::default().asset_host);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = unique_temp_dir();
        let path = dir.join(CARDS_FILE);
        fs::write(&path, "{not json").expect("write");
        let err = load_card_manifest(&path).expect_err("must fail");
        assert!(format!("{err:#}").contains("cards.json"));
        let _ = fs::remove_dir_all(dir);
    }

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "card_injector_load_test_{}_{}_{}",
            std::process::id(),
            nanos,
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }
}
