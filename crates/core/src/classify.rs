use crate::{Document, EngineConfig, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    /// An `svg` whose image still points at the host's original card art.
    AbilityCard { image: NodeId },
    /// A `button.image.cell` wrapping an `svg.item` graphic.
    ItemCard { graphic: NodeId },
    Unrecognized,
}

pub fn classify(doc: &Document, node: NodeId, config: &EngineConfig) -> NodeShape {
    if doc.is_tag(node, "svg") {
        if let Some(image) = first_image(doc, node) {
            let trusted = image_href(doc, image)
                .is_some_and(|href| href.contains(config.ability_source_fragment.as_str()));
            if trusted {
                return NodeShape::AbilityCard { image };
            }
        }
        return NodeShape::Unrecognized;
    }
    if is_item_container(doc, node) {
        if let Some(graphic) = item_graphic(doc, node) {
            if !has_host_labels(doc, node, config) {
                return NodeShape::ItemCard { graphic };
            }
        }
    }
    NodeShape::Unrecognized
}

/// `href`, falling back to the legacy `xlink:href`.
pub fn image_href(doc: &Document, image: NodeId) -> Option<&str> {
    doc.attr(image, "href")
        .filter(|href| !href.is_empty())
        .or_else(|| doc.attr(image, "xlink:href"))
        .filter(|href| !href.is_empty())
}

pub fn first_image(doc: &Document, node: NodeId) -> Option<NodeId> {
    doc.query_first(node, |d, id| d.is_tag(id, "image"))
}

pub fn is_item_container(doc: &Document, node: NodeId) -> bool {
    doc.is_tag(node, "button") && doc.has_class(node, "image") && doc.has_class(node, "cell")
}

pub fn item_graphic(doc: &Document, node: NodeId) -> Option<NodeId> {
    doc.query_first(node, |d, id| d.is_tag(id, "svg") && d.has_class(id, "item"))
}

// Name or cost labels the page rendered itself; the engine leaves such cards alone.
fn has_host_labels(doc: &Document, node: NodeId, config: &EngineConfig) -> bool {
    doc.query_first(node, |d, id| {
        (d.has_class(id, "name") || d.has_class(id, "cost"))
            && !d.has_class(id, &config.overlay_class)
    })
    .is_some()
}
