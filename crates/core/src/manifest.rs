use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Character name to canonical card names, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardManifest {
    pub characters: Vec<CharacterCards>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterCards {
    pub character: String,
    pub cards: Vec<String>,
}

impl CardManifest {
    /// Inserts or replaces a character's card list. A replaced entry keeps
    /// its original position.
    pub fn insert(&mut self, character: impl Into<String>, cards: Vec<String>) {
        let character = character.into();
        match self
            .characters
            .iter_mut()
            .find(|entry| entry.character == character)
        {
            Some(entry) => entry.cards = cards,
            None => self.characters.push(CharacterCards { character, cards }),
        }
    }

    pub fn card_count(&self) -> usize {
        self.characters.iter().map(|entry| entry.cards.len()).sum()
    }
}

impl Serialize for CardManifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.characters.len()))?;
        for entry in &self.characters {
            map.serialize_entry(&entry.character, &entry.cards)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CardManifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ManifestVisitor;

        impl<'de> Visitor<'de> for ManifestVisitor {
            type Value = CardManifest;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of character name to card names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut manifest = CardManifest::default();
                while let Some((character, cards)) = access.next_entry::<String, Vec<String>>()? {
                    manifest.insert(character, cards);
                }
                Ok(manifest)
            }
        }

        deserializer.deserialize_map(ManifestVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotCategory {
    Head,
    Body,
    Legs,
    OneHand,
    TwoHands,
    Small,
}

impl SlotCategory {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "head" => Some(Self::Head),
            "body" => Some(Self::Body),
            "legs" => Some(Self::Legs),
            "one-hand" | "one_hand" | "onehand" => Some(Self::OneHand),
            "two-hands" | "two_hands" | "twohands" => Some(Self::TwoHands),
            "small" => Some(Self::Small),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Body => "body",
            Self::Legs => "legs",
            Self::OneHand => "one-hand",
            Self::TwoHands => "two-hands",
            Self::Small => "small",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipSlot {
    Category(SlotCategory),
    /// Index into the manifest's `equip_slot_icons`.
    Icon(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    #[serde(default, deserialize_with = "de_cost")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equip_slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equip_slot_icon: Option<usize>,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_image: Option<String>,
}

impl ItemRecord {
    /// A named category wins over an icon index when both are present.
    pub fn equip_slot(&self) -> Option<EquipSlot> {
        if let Some(category) = self.equip_slot.as_deref().and_then(SlotCategory::from_keyword) {
            return Some(EquipSlot::Category(category));
        }
        self.equip_slot_icon.map(EquipSlot::Icon)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CostValue {
    Text(String),
    Int(i64),
    Float(f64),
}

fn de_cost<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<CostValue>::deserialize(deserializer)?;
    Ok(value.map(|cost| match cost {
        CostValue::Text(text) => text,
        CostValue::Int(value) => value.to_string(),
        CostValue::Float(value) => value.to_string(),
    }))
}

/// Item records plus the icon markup their `equip_slot_icon` indexes into.
/// Accepts a bare array of records as well as the object form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawItemManifest")]
pub struct ItemManifest {
    pub equip_slot_icons: Vec<String>,
    pub items: Vec<ItemRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawItemManifest {
    Bare(Vec<ItemRecord>),
    Full {
        #[serde(default)]
        equip_slot_icons: Vec<String>,
        items: Vec<ItemRecord>,
    },
}

impl From<RawItemManifest> for ItemManifest {
    fn from(raw: RawItemManifest) -> Self {
        match raw {
            RawItemManifest::Bare(items) => Self {
                equip_slot_icons: Vec::new(),
                items,
            },
            RawItemManifest::Full {
                equip_slot_icons,
                items,
            } => Self {
                equip_slot_icons,
                items,
            },
        }
    }
}
