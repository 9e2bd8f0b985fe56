use crate::schema::{CardManifest, ItemManifest, ItemRecord, ScrapedItem};
use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "webp"];

#[derive(Debug)]
pub struct CardManifestReport {
    pub manifest: CardManifest,
    pub warnings: Vec<String>,
}

/// One character per subfolder of `images_dir`, one card per image file
/// stem. Folders and files are taken in name order; folders without images
/// are skipped with a warning.
pub fn build_card_manifest(images_dir: &Path) -> anyhow::Result<CardManifestReport> {
    let mut folders = sorted_entries(images_dir)?;
    folders.retain(|path| path.is_dir());

    let mut manifest = CardManifest::default();
    let mut warnings = Vec::new();
    for folder in folders {
        let Some(character) = folder.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let cards: Vec<String> = sorted_entries(&folder)?
            .into_iter()
            .filter(|path| path.is_file() && has_image_extension(path))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        if cards.is_empty() {
            warnings.push(format!("no images in {character}"));
            continue;
        }
        manifest.insert(character, cards);
    }
    Ok(CardManifestReport { manifest, warnings })
}

fn sorted_entries(dir: &Path) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("read {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("list {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Moves inlined equip-slot markup into a shared icon list. Icons keep
/// first-seen order; each record points at its icon by index.
pub fn pack_scraped_items(scraped: Vec<ScrapedItem>) -> ItemManifest {
    let mut icons: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut items = Vec::with_capacity(scraped.len());
    for raw in scraped {
        let equip_slot_icon = raw
            .equip_slot_svg
            .filter(|svg| !svg.trim().is_empty())
            .map(|svg| {
                *positions.entry(svg.clone()).or_insert_with(|| {
                    icons.push(svg);
                    icons.len() - 1
                })
            });
        items.push(ItemRecord {
            name: raw.name,
            cost: raw.cost,
            equip_slot: None,
            equip_slot_icon,
            image_url: raw.image_url,
            code: raw.code,
            local_image: raw.local_image,
        });
    }
    ItemManifest {
        equip_slot_icons: icons,
        items,
    }
}
