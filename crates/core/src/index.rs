use crate::{edit_distance, normalize_name, CardManifest, ItemManifest, ItemRecord};
use std::collections::HashMap;

const IMAGE_ID_SUFFIX: &str = ".image.webp";

/// Decimal id from a reference ending in `/<digits>.image.webp`.
pub fn image_id_from_url(url: &str) -> Option<&str> {
    let stem = url.strip_suffix(IMAGE_ID_SUFFIX)?;
    let (_, digits) = stem.rsplit_once('/')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

/// Canonical card plus the character whose art folder holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRef<'a> {
    pub character: &'a str,
    pub card: &'a str,
}

/// Read-only lookup tables built once from the manifests.
#[derive(Debug, Clone, Default)]
pub struct LookupIndex {
    card_to_character: HashMap<String, String>,
    // Insertion-ordered; fuzzy search walks this order and keeps the first
    // key at the smallest distance.
    normalized: Vec<(String, String)>,
    normalized_pos: HashMap<String, usize>,
    items_by_image_id: HashMap<String, ItemRecord>,
    equip_slot_icons: Vec<String>,
}

impl LookupIndex {
    pub fn build(cards: &CardManifest, items: &ItemManifest) -> Self {
        let mut index = Self::default();
        for entry in &cards.characters {
            for card in &entry.cards {
                index
                    .card_to_character
                    .insert(card.clone(), entry.character.clone());
                index.insert_normalized(normalize_name(card), card.clone());
            }
        }
        for item in &items.items {
            if let Some(id) = image_id_from_url(&item.image_url) {
                index.items_by_image_id.insert(id.to_string(), item.clone());
            }
        }
        index.equip_slot_icons = items.equip_slot_icons.clone();
        index
    }

    fn insert_normalized(&mut self, key: String, card: String) {
        match self.normalized_pos.get(&key) {
            Some(pos) => self.normalized[*pos].1 = card,
            None => {
                self.normalized_pos.insert(key.clone(), self.normalized.len());
                self.normalized.push((key, card));
            }
        }
    }

    pub fn card_count(&self) -> usize {
        self.card_to_character.len()
    }

    pub fn normalized_count(&self) -> usize {
        self.normalized.len()
    }

    pub fn item_count(&self) -> usize {
        self.items_by_image_id.len()
    }

    pub fn character_of(&self, card: &str) -> Option<&str> {
        self.card_to_character.get(card).map(String::as_str)
    }

    /// Canonical name stored under an already-normalized key.
    pub fn exact(&self, key: &str) -> Option<&str> {
        let pos = self.normalized_pos.get(key)?;
        Some(self.normalized[*pos].1.as_str())
    }

    /// Closest normalized key within `max_distance`; ties go to the key
    /// inserted first.
    pub fn closest(&self, key: &str, max_distance: usize) -> Option<&str> {
        let len = key.chars().count();
        let mut best: Option<(usize, &str)> = None;
        for (candidate, card) in &self.normalized {
            if candidate.chars().count().abs_diff(len) > max_distance {
                continue;
            }
            let dist = edit_distance(key, candidate);
            if dist > max_distance {
                continue;
            }
            if best.map_or(true, |(best_dist, _)| dist < best_dist) {
                best = Some((dist, card.as_str()));
                if dist == 0 {
                    break;
                }
            }
        }
        best.map(|(_, card)| card)
    }

    /// Exact normalized lookup, then fuzzy fallback.
    pub fn match_key(&self, key: &str, max_distance: usize) -> Option<CardRef<'_>> {
        let card = self.exact(key).or_else(|| self.closest(key, max_distance))?;
        let character = self.character_of(card)?;
        Some(CardRef { character, card })
    }

    pub fn item(&self, image_id: &str) -> Option<&ItemRecord> {
        self.items_by_image_id.get(image_id)
    }

    /// Icon list the item records' `equip_slot_icon` values index into.
    pub fn item_icons(&self) -> &[String] {
        &self.equip_slot_icons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(entries: &[(&str, &[&str])]) -> CardManifest {
        let mut manifest = CardManifest::default();
        for (character, cards) in entries {
            manifest.insert(*character, cards.iter().map(|c| c.to_string()).collect());
        }
        manifest
    }

    fn item(name: &str, url: &str) -> ItemRecord {
        ItemRecord {
            name: name.to_string(),
            cost: Some("10".to_string()),
            equip_slot: None,
            equip_slot_icon: None,
            image_url: url.to_string(),
            code: None,
            local_image: None,
        }
    }

    #[test]
    fn image_id_requires_digit_segment_and_suffix() {
        assert_eq!(
            image_id_from_url("https://host/public/images/byid/12345.image.webp"),
            Some("12345")
        );
        assert_eq!(image_id_from_url("/a/12x.image.webp"), None);
        assert_eq!(image_id_from_url("/a/.image.webp"), None);
        assert_eq!(image_id_from_url("/a/123.image.png"), None);
        assert_eq!(image_id_from_url("123.image.webp"), None);
    }

    #[test]
    fn builds_card_and_normalized_tables() {
        let index = LookupIndex::build(
            &manifest(&[("Brute", &["eye-for-an-eye", "trample"])]),
            &ItemManifest::default(),
        );
        assert_eq!(index.card_count(), 2);
        assert_eq!(index.character_of("trample"), Some("Brute"));
        assert_eq!(index.exact("eye-for-an-eye"), Some("eye-for-an-eye"));
        assert_eq!(index.exact("missing"), None);
    }

    #[test]
    fn colliding_keys_keep_the_later_card() {
        let index = LookupIndex::build(
            &manifest(&[("Brute", &["Shield Bash"]), ("Tinkerer", &["shield-bash"])]),
            &ItemManifest::default(),
        );
        assert_eq!(index.normalized_count(), 1);
        assert_eq!(index.exact("shield-bash"), Some("shield-bash"));
        let found = index.match_key("shield-bash", 2).expect("match");
        assert_eq!(found.character, "Tinkerer");
    }

    #[test]
    fn fuzzy_respects_bound_and_first_inserted_tie() {
        let index = LookupIndex::build(
            &manifest(&[("A", &["abcd", "abce"]), ("B", &["zzzzzzz"])]),
            &ItemManifest::default(),
        );
        assert_eq!(index.closest("abcx", 2), Some("abcd"));
        assert_eq!(index.closest("zzzzaaa", 2), None);
        assert_eq!(index.closest("zzzzzaa", 2), Some("zzzzzzz"));
    }

    #[test]
    fn items_are_keyed_by_embedded_id() {
        let items = ItemManifest {
            equip_slot_icons: vec!["<svg/>".to_string()],
            items: vec![
                item("Boots of Striding", "https://h/public/images/byid/101.image.webp"),
                item("Broken", "https://h/no-id.png"),
                item("Cloak", "https://h/public/images/byid/202.image.webp"),
            ],
        };
        let index = LookupIndex::build(&CardManifest::default(), &items);
        assert_eq!(index.item_count(), 2);
        assert_eq!(index.item("101").map(|i| i.name.as_str()), Some("Boots of Striding"));
        assert!(index.item("999").is_none());
        assert_eq!(index.item_icons(), ["<svg/>".to_string()].as_slice());
    }
}
