//! Writes resolved assets back into the host's nodes.
//!
//! Every write is guarded: the ability patch compares the computed asset URL
//! against the current reference, and the item patch compares the resolved id
//! and orientation against the marks left on the container by the previous
//! pass. A node that has not changed therefore produces no mutation at all.

use crate::{
    equip_slot_icon, image_href, item_graphic, AbilityMatch, Document, EngineConfig, Event,
    EventBus, ItemMatch, NodeId,
};

const ROTATED_CLASS: &str = "rotate";
const ORIENTATION_UPRIGHT: &str = "upright";
const ORIENTATION_ROTATED: &str = "rotated";

const BASE_STYLE: &str = "position: absolute; margin: 0; z-index: 10; pointer-events: none;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverlayRole {
    Name,
    Cost,
    EquipSlot,
}

impl OverlayRole {
    fn of(doc: &Document, node: NodeId) -> Option<Self> {
        if doc.has_class(node, "equip-slot") {
            Some(Self::EquipSlot)
        } else if doc.has_class(node, "name") {
            Some(Self::Name)
        } else if doc.has_class(node, "cost") {
            Some(Self::Cost)
        } else {
            None
        }
    }

    fn placement(self, rotated: bool) -> &'static str {
        match (self, rotated) {
            (Self::Name, false) => "top: 5px; left: 5px; font-size: 18px;",
            (Self::Name, true) => {
                "top: 5px; left: 5px; font-size: 14px; transform: rotate(90deg); transform-origin: top left;"
            }
            (Self::Cost, false) => "bottom: 5px; left: 5px; font-size: 20px;",
            (Self::Cost, true) => {
                "bottom: 5px; left: 5px; font-size: 16px; transform: rotate(90deg); transform-origin: bottom left;"
            }
            (Self::EquipSlot, false) => "bottom: 5px; left: 50%; transform: translateX(-50%);",
            (Self::EquipSlot, true) => {
                "bottom: 50%; right: 5px; transform: rotate(90deg) translateX(50%);"
            }
        }
    }

    fn style(self, rotated: bool) -> String {
        format!("{BASE_STYLE} {}", self.placement(rotated))
    }
}

fn icon_size(rotated: bool) -> &'static str {
    if rotated {
        "20px"
    } else {
        "24px"
    }
}

/// Points the card's image at the bundled art, hides the host's labels and
/// outlines the graphic. Returns `false` when the image already shows the
/// target asset.
pub fn apply_ability_card(
    doc: &mut Document,
    node: NodeId,
    found: &AbilityMatch,
    config: &EngineConfig,
    events: &mut EventBus,
) -> bool {
    let target = config.asset_url(&found.character, &found.card);
    if image_href(doc, found.image) == Some(target.as_str()) {
        return false;
    }

    doc.set_attr(found.image, "href", &target);
    if doc.has_attr(found.image, "xlink:href") {
        doc.set_attr(found.image, "xlink:href", &target);
    }
    for label in doc.query_tag(node, "text") {
        if doc.style(label, "opacity") != Some("0") {
            doc.set_style(label, "opacity", "0");
        }
    }
    if doc.style(node, "outline") != Some(config.ability_outline.as_str()) {
        doc.set_style(node, "outline", &config.ability_outline);
    }

    tracing::debug!(
        node = node.index(),
        label = %found.display_name,
        character = %found.character,
        card = %found.card,
        "ability card patched"
    );
    events.push(Event::AbilityCardPatched {
        node,
        character: found.character.clone(),
        card: found.card.clone(),
        url: target,
    });
    true
}

/// Injects name, cost and equip-slot overlays for a resolved item. Returns
/// `false` when the container already carries an overlay for this id in the
/// current orientation.
pub fn apply_item_card(
    doc: &mut Document,
    node: NodeId,
    found: &ItemMatch<'_>,
    icons: &[String],
    config: &EngineConfig,
    events: &mut EventBus,
) -> bool {
    let rotated = doc.has_class(found.graphic, ROTATED_CLASS);
    let orientation = if rotated {
        ORIENTATION_ROTATED
    } else {
        ORIENTATION_UPRIGHT
    };
    let same_id = doc.attr(node, &config.item_mark_attribute) == Some(found.image_id.as_str());
    let same_orientation = doc.attr(node, &config.orientation_attribute) == Some(orientation);
    if same_id && same_orientation {
        return false;
    }

    if same_id {
        reorient_overlay(doc, node, rotated, config);
        doc.set_attr(node, &config.orientation_attribute, orientation);
        events.push(Event::ItemOverlayReoriented {
            node,
            image_id: found.image_id.clone(),
            rotated,
        });
        return true;
    }

    remove_overlay(doc, node, config);
    if doc.style(node, "position") != Some("relative") {
        doc.set_style(node, "position", "relative");
    }

    let item = found.item;
    if !item.name.trim().is_empty() {
        let label = create_label(doc, OverlayRole::Name, &item.name, rotated, config);
        doc.append_child(node, label);
    }
    if let Some(cost) = item.cost.as_deref().filter(|cost| !cost.trim().is_empty()) {
        let label = create_label(doc, OverlayRole::Cost, cost, rotated, config);
        doc.append_child(node, label);
    }
    if let Some(markup) = item
        .equip_slot()
        .and_then(|slot| equip_slot_icon(slot, icons))
    {
        let icon = create_equip_slot_icon(doc, markup, rotated, config);
        doc.append_child(node, icon);
    }

    if doc.style(found.graphic, "outline") != Some(config.item_outline.as_str()) {
        doc.set_style(found.graphic, "outline", &config.item_outline);
    }
    doc.set_attr(node, &config.item_mark_attribute, &found.image_id);
    doc.set_attr(node, &config.orientation_attribute, orientation);

    tracing::debug!(
        node = node.index(),
        image_id = %found.image_id,
        name = %item.name,
        "item overlay injected"
    );
    events.push(Event::ItemOverlayInjected {
        node,
        image_id: found.image_id.clone(),
        name: item.name.clone(),
    });
    true
}

/// Strips engine overlays and marks so the host's original card shows
/// through. Returns `false` when there was nothing to strip.
pub fn clear_item_overlay(
    doc: &mut Document,
    node: NodeId,
    config: &EngineConfig,
    events: &mut EventBus,
) -> bool {
    let mut changed = remove_overlay(doc, node, config);
    for attr in [&config.item_mark_attribute, &config.orientation_attribute] {
        if doc.has_attr(node, attr) {
            doc.remove_attr(node, attr);
            changed = true;
        }
    }
    if let Some(graphic) = item_graphic(doc, node) {
        if doc.style(graphic, "outline") == Some(config.item_outline.as_str()) {
            doc.remove_style(graphic, "outline");
            changed = true;
        }
    }
    if changed {
        tracing::debug!(node = node.index(), "item overlay cleared");
        events.push(Event::ItemOverlayCleared { node });
    }
    changed
}

/// Outermost engine-owned elements under `node`.
fn overlay_elements(doc: &Document, node: NodeId, config: &EngineConfig) -> Vec<NodeId> {
    let class = config.overlay_class.as_str();
    doc.query_all(node, |d, id| {
        d.has_class(id, class)
            && d.parent(id)
                .and_then(|parent| d.closest(parent, |d, p| p == node || d.has_class(p, class)))
                == Some(node)
    })
}

fn remove_overlay(doc: &mut Document, node: NodeId, config: &EngineConfig) -> bool {
    let overlays = overlay_elements(doc, node, config);
    for overlay in &overlays {
        doc.remove(*overlay);
    }
    !overlays.is_empty()
}

fn reorient_overlay(doc: &mut Document, node: NodeId, rotated: bool, config: &EngineConfig) {
    for overlay in overlay_elements(doc, node, config) {
        let Some(role) = OverlayRole::of(doc, overlay) else {
            continue;
        };
        doc.set_style_text(overlay, &role.style(rotated));
        if role == OverlayRole::EquipSlot {
            let size = icon_size(rotated);
            for svg in doc.query_tag(overlay, "svg") {
                doc.set_style(svg, "width", size);
                doc.set_style(svg, "height", size);
            }
        }
    }
}

fn create_label(
    doc: &mut Document,
    role: OverlayRole,
    text: &str,
    rotated: bool,
    config: &EngineConfig,
) -> NodeId {
    let role_class = if role == OverlayRole::Name { "name" } else { "cost" };
    let p = doc.create_element("p");
    doc.set_attr(
        p,
        "class",
        &format!("{role_class} top-half germania shadow {}", config.overlay_class),
    );
    doc.set_text(p, text);
    doc.set_style_text(p, &role.style(rotated));
    p
}

fn create_equip_slot_icon(
    doc: &mut Document,
    markup: &str,
    rotated: bool,
    config: &EngineConfig,
) -> NodeId {
    let div = doc.create_element("div");
    doc.set_attr(
        div,
        "class",
        &format!("overlay icon equip-slot {}", config.overlay_class),
    );
    doc.set_style_text(div, &OverlayRole::EquipSlot.style(rotated));

    let svg = doc.create_element("svg");
    doc.set_attr(svg, "class", "icon small");
    doc.set_attr(svg, "fill", "#6B7C9B");
    doc.set_attr(svg, "stroke", "black");
    let size = icon_size(rotated);
    doc.set_style(svg, "width", size);
    doc.set_style(svg, "height", size);
    doc.set_markup(svg, markup);
    doc.append_child(div, svg);
    div
}
