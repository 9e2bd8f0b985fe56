use crate::{
    classify, first_image, image_href, image_id_from_url, normalize_name, Document, EngineConfig,
    ItemRecord, LookupIndex, NodeId, NodeShape,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityMatch {
    /// Trimmed label text that produced the match.
    pub display_name: String,
    pub character: String,
    pub card: String,
    pub image: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemMatch<'a> {
    pub image_id: String,
    pub item: &'a ItemRecord,
    pub graphic: NodeId,
}

/// Matches the first text label that resolves, exact before fuzzy within
/// that label. Later labels are not consulted once one matches.
pub fn resolve_ability_card(
    doc: &Document,
    node: NodeId,
    index: &LookupIndex,
    config: &EngineConfig,
) -> Option<AbilityMatch> {
    let NodeShape::AbilityCard { image } = classify(doc, node, config) else {
        return None;
    };
    for label in doc.query_tag(node, "text") {
        let content = doc.text_content(label);
        let text = content.trim();
        if text.is_empty() {
            continue;
        }
        // A punctuation-only label normalizes to "" and can still reach
        // short keys through the fuzzy fallback.
        let key = normalize_name(text);
        if let Some(found) = index.match_key(&key, config.max_fuzzy_distance) {
            return Some(AbilityMatch {
                display_name: text.to_string(),
                character: found.character.to_string(),
                card: found.card.to_string(),
                image,
            });
        }
    }
    None
}

/// Looks up the item whose id is embedded in the graphic's image reference.
/// `None` for non-item nodes as well as for ids the index does not know.
pub fn resolve_item_card<'a>(
    doc: &Document,
    node: NodeId,
    index: &'a LookupIndex,
    config: &EngineConfig,
) -> Option<ItemMatch<'a>> {
    let NodeShape::ItemCard { graphic } = classify(doc, node, config) else {
        return None;
    };
    let image = first_image(doc, graphic)?;
    let image_id = image_id_from_url(image_href(doc, image)?)?;
    let item = index.item(image_id)?;
    Some(ItemMatch {
        image_id: image_id.to_string(),
        item,
        graphic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardManifest, ItemManifest, NodeSnapshot};

    const ORIGINAL: &str = "https://host/public/images/byid/4242";

    fn index() -> LookupIndex {
        let mut cards = CardManifest::default();
        cards.insert("Brute", vec!["eye-for-an-eye".to_string()]);
        cards.insert("Spellweaver", vec!["frost-armor".to_string()]);
        LookupIndex::build(&cards, &ItemManifest::default())
    }

    fn card(labels: &[&str]) -> Document {
        let mut svg = NodeSnapshot::new("svg").child(NodeSnapshot::new("image").attr("href", ORIGINAL));
        for label in labels {
            svg = svg.child(NodeSnapshot::new("text").text(label));
        }
        Document::from_snapshot(&svg)
    }

    fn resolve(labels: &[&str]) -> Option<AbilityMatch> {
        let doc = card(labels);
        resolve_ability_card(&doc, doc.root(), &index(), &EngineConfig::default())
    }

    #[test]
    fn skips_blank_labels() {
        let found = resolve(&["   ", "Eye For An Eye"]).expect("match");
        assert_eq!(found.display_name, "Eye For An Eye");
        assert_eq!(found.card, "eye-for-an-eye");
    }

    #[test]
    fn first_matching_label_wins() {
        let found = resolve(&["Frost Armour", "Eye For An Eye"]).expect("match");
        assert_eq!(found.card, "frost-armor");
        assert_eq!(found.character, "Spellweaver");
    }

    #[test]
    fn unmatched_labels_yield_none() {
        assert!(resolve(&["Initiative 12", "Move 3"]).is_none());
        assert!(resolve(&[]).is_none());
    }

    #[test]
    fn punctuation_only_label_falls_through_to_fuzzy() {
        let mut cards = CardManifest::default();
        cards.insert("Brute", vec!["ab".to_string()]);
        let index = LookupIndex::build(&cards, &ItemManifest::default());
        let doc = card(&["!"]);
        let found = resolve_ability_card(&doc, doc.root(), &index, &EngineConfig::default())
            .expect("match");
        assert_eq!(found.card, "ab");
        assert_eq!(found.display_name, "!");
        assert!(resolve(&["!"]).is_none());
    }

    #[test]
    fn untrusted_image_is_rejected_before_matching() {
        let svg = NodeSnapshot::new("svg")
            .child(NodeSnapshot::new("image").attr("href", "https://other/eye.jpeg"))
            .child(NodeSnapshot::new("text").text("Eye For An Eye"));
        let doc = Document::from_snapshot(&svg);
        assert!(resolve_ability_card(&doc, doc.root(), &index(), &EngineConfig::default()).is_none());
    }
}
