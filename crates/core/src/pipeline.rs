use crate::{
    apply_ability_card, apply_item_card, classify, clear_item_overlay, resolve_ability_card,
    resolve_item_card, Document, EngineConfig, EventBus, LookupIndex, NodeId, NodeShape,
};

/// Resolve-then-patch for single nodes, sharing one read-only index.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    pub index: &'a LookupIndex,
    pub config: &'a EngineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(index: &'a LookupIndex, config: &'a EngineConfig) -> Self {
        Self { index, config }
    }

    pub fn process(&self, doc: &mut Document, node: NodeId, events: &mut EventBus) -> bool {
        match classify(doc, node, self.config) {
            NodeShape::AbilityCard { .. } => self.process_ability(doc, node, events),
            NodeShape::ItemCard { .. } => self.process_item(doc, node, events),
            NodeShape::Unrecognized => false,
        }
    }

    pub fn process_ability(&self, doc: &mut Document, node: NodeId, events: &mut EventBus) -> bool {
        match resolve_ability_card(doc, node, self.index, self.config) {
            Some(found) => apply_ability_card(doc, node, &found, self.config, events),
            None => false,
        }
    }

    /// Unresolvable item containers lose any overlay from an earlier pass.
    pub fn process_item(&self, doc: &mut Document, node: NodeId, events: &mut EventBus) -> bool {
        if !matches!(classify(doc, node, self.config), NodeShape::ItemCard { .. }) {
            return false;
        }
        match resolve_item_card(doc, node, self.index, self.config) {
            Some(found) => apply_item_card(
                doc,
                node,
                &found,
                self.index.item_icons(),
                self.config,
                events,
            ),
            None => clear_item_overlay(doc, node, self.config, events),
        }
    }

    /// Processes `root` and every descendant: ability cards first, then item
    /// containers. Returns how many nodes were changed.
    pub fn scan(&self, doc: &mut Document, root: NodeId, events: &mut EventBus) -> usize {
        let mut nodes = vec![root];
        nodes.extend(doc.descendants(root));

        let (svgs, buttons): (Vec<NodeId>, Vec<NodeId>) = (
            nodes.iter().copied().filter(|id| doc.is_tag(*id, "svg")).collect(),
            nodes.iter().copied().filter(|id| doc.is_tag(*id, "button")).collect(),
        );

        let mut changed = 0;
        for node in svgs {
            if self.process_ability(doc, node, events) {
                changed += 1;
            }
        }
        for node in buttons {
            if self.process_item(doc, node, events) {
                changed += 1;
            }
        }
        changed
    }
}
