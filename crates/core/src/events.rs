use crate::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    AbilityCardPatched {
        node: NodeId,
        character: String,
        card: String,
        url: String,
    },
    ItemOverlayInjected {
        node: NodeId,
        image_id: String,
        name: String,
    },
    ItemOverlayReoriented {
        node: NodeId,
        image_id: String,
        rotated: bool,
    },
    ItemOverlayCleared { node: NodeId },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
