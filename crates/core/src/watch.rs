use crate::{is_item_container, Document, EventBus, MutationRecord, ObserveOptions, Pipeline};

/// Attributes whose changes can alter a card's identity or orientation.
pub const WATCHED_ATTRIBUTES: [&str; 3] = ["href", "xlink:href", "class"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchState {
    #[default]
    Idle,
    Observing,
}

#[derive(Debug, Default)]
pub struct MutationWatcher {
    state: WatchState,
}

impl MutationWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn observe_options() -> ObserveOptions {
        ObserveOptions {
            child_list: true,
            subtree: true,
            attributes: true,
            attribute_filter: Some(WATCHED_ATTRIBUTES.iter().map(|a| a.to_string()).collect()),
        }
    }

    /// Idle -> Observing. There is no way back; observation lasts as long as
    /// the document does.
    pub fn start(&mut self, doc: &mut Document) {
        if self.state == WatchState::Observing {
            return;
        }
        let root = doc.root();
        doc.observe(root, Self::observe_options());
        self.state = WatchState::Observing;
    }

    /// Runs resolve-and-patch for every node a batch touches, in delivery
    /// order. Returns how many nodes changed.
    pub fn handle(
        &self,
        pipeline: &Pipeline<'_>,
        doc: &mut Document,
        records: Vec<MutationRecord>,
        events: &mut EventBus,
    ) -> usize {
        if self.state == WatchState::Idle {
            return 0;
        }
        let root = doc.root();
        let mut changed = 0;
        for record in records {
            match record {
                MutationRecord::ChildList { target, added, .. } => {
                    for node in added {
                        // Added and removed again within the same batch.
                        if !doc.contains(root, node) {
                            continue;
                        }
                        changed += pipeline.scan(doc, node, events);
                    }
                    // A swapped graphic changes which item the container shows.
                    if let Some(button) = doc.closest(target, is_item_container) {
                        if doc.contains(root, button)
                            && pipeline.process_item(doc, button, events)
                        {
                            changed += 1;
                        }
                    }
                }
                MutationRecord::Attributes { target, name } => {
                    if !WATCHED_ATTRIBUTES.contains(&name.as_str()) {
                        continue;
                    }
                    if is_item_container(doc, target) {
                        if pipeline.process_item(doc, target, events) {
                            changed += 1;
                        }
                        continue;
                    }
                    let Some(svg) = doc.closest(target, |d, id| d.is_tag(id, "svg")) else {
                        continue;
                    };
                    if pipeline.process_ability(doc, svg, events) {
                        changed += 1;
                    }
                    if let Some(button) = doc.closest(svg, is_item_container) {
                        if pipeline.process_item(doc, button, events) {
                            changed += 1;
                        }
                    }
                }
            }
        }
        changed
    }

    /// Drains and handles records until none are pending or `max_rounds`
    /// batches have run. The engine's own writes show up as records too;
    /// handling them is a no-op, so the queue empties after a round or two.
    pub fn settle(
        &self,
        pipeline: &Pipeline<'_>,
        doc: &mut Document,
        events: &mut EventBus,
        max_rounds: u32,
    ) -> usize {
        let mut changed = 0;
        for _ in 0..max_rounds {
            let records = doc.take_records();
            if records.is_empty() {
                return changed;
            }
            changed += self.handle(pipeline, doc, records, events);
        }
        if doc.pending_records() > 0 {
            tracing::warn!(
                pending = doc.pending_records(),
                rounds = max_rounds,
                "mutation queue not drained"
            );
        }
        changed
    }
}
