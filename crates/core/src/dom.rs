//! Minimal element tree standing in for the host page.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by copyable
//! [`NodeId`] handles. The engine never owns a node's lifecycle: it reads
//! attributes, writes a few of them, and appends or removes its own overlay
//! children. Once [`Document::observe`] has been called, writes inside the
//! observed subtree are queued as [`MutationRecord`]s, the same way a browser
//! mutation observer would see them.
//!
//! The arena only grows. Removed subtrees keep their slots so stale handles
//! stay valid, which makes a `Document` suited to one page load or one
//! request; a long-lived document accumulates every overlay it ever dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    style: Vec<(String, String)>,
    text: String,
    markup: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            style: Vec::new(),
            text: String::new(),
            markup: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MutationRecord {
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    Attributes {
        target: NodeId,
        name: String,
    },
}

impl MutationRecord {
    pub fn target(&self) -> NodeId {
        match self {
            Self::ChildList { target, .. } | Self::Attributes { target, .. } => *target,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub subtree: bool,
    pub attributes: bool,
    /// `None` records every attribute.
    pub attribute_filter: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
struct Observation {
    target: NodeId,
    options: ObserveOptions,
}

/// Serializable tree form of a document or subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn child(mut self, child: NodeSnapshot) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    observation: Option<Observation>,
    records: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
            root: NodeId(0),
            observation: None,
            records: Vec::new(),
        }
    }

    pub fn from_snapshot(snapshot: &NodeSnapshot) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            observation: None,
            records: Vec::new(),
        };
        doc.root = doc.build_detached(snapshot);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Builds a detached subtree from a snapshot and returns its root.
    pub fn build_detached(&mut self, snapshot: &NodeSnapshot) -> NodeId {
        let id = self.create_element(&snapshot.tag);
        {
            let el = &mut self.nodes[id.0];
            el.attrs = snapshot
                .attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            el.style = snapshot
                .style
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            el.text = snapshot.text.clone();
            el.markup = snapshot.markup.clone();
        }
        for child in &snapshot.children {
            let child_id = self.build_detached(child);
            self.nodes[child_id.0].parent = Some(id);
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub fn snapshot(&self, node: NodeId) -> NodeSnapshot {
        let el = &self.nodes[node.0];
        NodeSnapshot {
            tag: el.tag.clone(),
            attrs: el.attrs.iter().cloned().collect(),
            style: el.style.iter().cloned().collect(),
            text: el.text.clone(),
            markup: el.markup.clone(),
            children: el.children.iter().map(|c| self.snapshot(*c)).collect(),
        }
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn is_tag(&self, node: NodeId, tag: &str) -> bool {
        self.nodes[node.0].tag.eq_ignore_ascii_case(tag)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.nodes[child.0].parent.is_some() {
            self.remove(child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.record_child_list(parent, vec![child], Vec::new());
    }

    /// Detaches `node` from its parent. The subtree stays in the arena and
    /// can be re-attached; its slots are never reclaimed.
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != node);
        self.record_child_list(parent, Vec::new(), vec![node]);
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0]
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let attrs = &mut self.nodes[node.0].attrs;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
        self.record_attribute(node, name);
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        let attrs = &mut self.nodes[node.0].attrs;
        let before = attrs.len();
        attrs.retain(|(k, _)| k != name);
        if attrs.len() != before {
            self.record_attribute(node, name);
        }
    }

    pub fn classes(&self, node: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.attr(node, "class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).any(|c| c == class)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let value = match self.attr(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attr(node, "class", &value);
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let value = self
            .classes(node)
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(node, "class", &value);
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes[node.0]
            .style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let style = &mut self.nodes[node.0].style;
        match style.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value.to_string(),
            None => style.push((property.to_string(), value.to_string())),
        }
        self.record_attribute(node, "style");
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        let style = &mut self.nodes[node.0].style;
        let before = style.len();
        style.retain(|(k, _)| k != property);
        if style.len() != before {
            self.record_attribute(node, "style");
        }
    }

    /// Replaces the whole inline style from `prop: value;` declarations.
    pub fn set_style_text(&mut self, node: NodeId, css: &str) {
        self.nodes[node.0].style = parse_declarations(css);
        self.record_attribute(node, "style");
    }

    pub fn style_text(&self, node: NodeId) -> String {
        self.nodes[node.0]
            .style
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].text = text.to_string();
    }

    /// Own text followed by every descendant's text in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = self.nodes[node.0].text.clone();
        for child in self.descendants(node) {
            out.push_str(&self.nodes[child.0].text);
        }
        out
    }

    pub fn markup(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].markup.as_deref()
    }

    pub fn set_markup(&mut self, node: NodeId, markup: &str) {
        self.nodes[node.0].markup = Some(markup.to_string());
    }

    /// Descendants of `node` in document order, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        out
    }

    pub fn query_all<F>(&self, node: NodeId, pred: F) -> Vec<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.descendants(node)
            .into_iter()
            .filter(|id| pred(self, *id))
            .collect()
    }

    pub fn query_first<F>(&self, node: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.descendants(node).into_iter().find(|id| pred(self, *id))
    }

    pub fn query_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        self.query_all(node, |doc, id| doc.is_tag(id, tag))
    }

    /// Nearest inclusive ancestor matching `pred`.
    pub fn closest<F>(&self, node: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if pred(self, id) {
                return Some(id);
            }
            cursor = self.nodes[id.0].parent;
        }
        None
    }

    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.closest(node, |_, id| id == ancestor).is_some()
    }

    pub fn observe(&mut self, target: NodeId, options: ObserveOptions) {
        self.observation = Some(Observation { target, options });
    }

    pub fn disconnect(&mut self) {
        self.observation = None;
        self.records.clear();
    }

    pub fn is_observed(&self) -> bool {
        self.observation.is_some()
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn pending_records(&self) -> usize {
        self.records.len()
    }

    fn in_scope(&self, observation: &Observation, node: NodeId) -> bool {
        if node == observation.target {
            return true;
        }
        observation.options.subtree && self.contains(observation.target, node)
    }

    fn record_child_list(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        let Some(observation) = self.observation.as_ref() else {
            return;
        };
        if !observation.options.child_list || !self.in_scope(observation, target) {
            return;
        }
        self.records.push(MutationRecord::ChildList {
            target,
            added,
            removed,
        });
    }

    fn record_attribute(&mut self, target: NodeId, name: &str) {
        let Some(observation) = self.observation.as_ref() else {
            return;
        };
        if !observation.options.attributes || !self.in_scope(observation, target) {
            return;
        }
        if let Some(filter) = observation.options.attribute_filter.as_ref() {
            if !filter.iter().any(|f| f == name) {
                return;
            }
        }
        self.records.push(MutationRecord::Attributes {
            target,
            name: name.to_string(),
        });
    }
}

fn parse_declarations(css: &str) -> Vec<(String, String)> {
    css.split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            let value = value.trim();
            if prop.is_empty() || value.is_empty() {
                return None;
            }
            Some((prop.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_records() -> ObserveOptions {
        ObserveOptions {
            child_list: true,
            subtree: true,
            attributes: true,
            attribute_filter: None,
        }
    }

    #[test]
    fn descendants_follow_document_order() {
        let snapshot = NodeSnapshot::new("body")
            .child(
                NodeSnapshot::new("svg")
                    .child(NodeSnapshot::new("text").text("a"))
                    .child(NodeSnapshot::new("text").text("b")),
            )
            .child(NodeSnapshot::new("text").text("c"));
        let doc = Document::from_snapshot(&snapshot);
        let texts: Vec<String> = doc
            .query_tag(doc.root(), "text")
            .into_iter()
            .map(|id| doc.text_content(id))
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert_eq!(doc.text_content(doc.root()), "abc");
    }

    #[test]
    fn writes_before_observe_are_not_recorded() {
        let mut doc = Document::new();
        let svg = doc.create_element("svg");
        doc.append_child(doc.root(), svg);
        doc.set_attr(svg, "class", "card");
        assert_eq!(doc.pending_records(), 0);

        doc.observe(doc.root(), all_records());
        doc.set_attr(svg, "class", "card rotate");
        let records = doc.take_records();
        assert_eq!(
            records,
            vec![MutationRecord::Attributes {
                target: svg,
                name: "class".to_string()
            }]
        );
    }

    #[test]
    fn attribute_filter_and_detached_nodes() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.observe(
            root,
            ObserveOptions {
                attribute_filter: Some(vec!["href".to_string()]),
                ..all_records()
            },
        );
        let detached = doc.create_element("image");
        doc.set_attr(detached, "href", "x");
        assert_eq!(doc.pending_records(), 0);

        doc.append_child(root, detached);
        doc.set_attr(detached, "data-x", "1");
        doc.set_style(detached, "opacity", "0");
        doc.set_attr(detached, "href", "y");
        let records = doc.take_records();
        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], MutationRecord::ChildList { .. }));
        assert_eq!(
            records[1],
            MutationRecord::Attributes {
                target: detached,
                name: "href".to_string()
            }
        );
    }

    #[test]
    fn class_helpers_and_closest() {
        let mut doc = Document::new();
        let button = doc.create_element("BUTTON");
        doc.set_attr(button, "class", "image cell");
        let svg = doc.create_element("svg");
        doc.append_child(doc.root(), button);
        doc.append_child(button, svg);
        doc.add_class(svg, "item");
        doc.add_class(svg, "rotate");
        assert!(doc.has_class(svg, "rotate"));
        doc.remove_class(svg, "rotate");
        assert_eq!(doc.attr(svg, "class"), Some("item"));
        assert_eq!(
            doc.closest(svg, |d, id| d.is_tag(id, "button")),
            Some(button)
        );
        assert!(doc.contains(doc.root(), svg));
    }

    #[test]
    fn style_text_roundtrip_keeps_declaration_order() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_style_text(p, "position: absolute; margin: 0;\n  top: 5px;");
        assert_eq!(doc.style(p, "top"), Some("5px"));
        assert_eq!(doc.style_text(p), "position: absolute; margin: 0; top: 5px;");
    }

    #[test]
    fn remove_detaches_subtree() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(div, inner);
        doc.append_child(doc.root(), div);
        doc.remove(div);
        assert!(doc.children(doc.root()).is_empty());
        assert_eq!(doc.parent(inner), Some(div));
        assert!(!doc.contains(doc.root(), inner));
    }

    #[test]
    fn removed_nodes_keep_their_slots() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.create_element("p");
        doc.set_text(p, "label");
        doc.append_child(root, p);
        let before = doc.len();

        doc.remove(p);
        assert_eq!(doc.len(), before);
        assert_eq!(doc.text_content(p), "label");
        doc.append_child(root, p);
        assert_eq!(doc.children(root), [p].as_slice());
    }
}
