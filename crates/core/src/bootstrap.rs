use crate::{
    CardManifest, Document, EngineConfig, Event, EventBus, InjectorError, ItemManifest,
    LookupIndex, MutationWatcher, Pipeline, WatchState,
};

/// Persisted on/off toggle owned by the popup. `None` means never set.
pub trait FlagStore {
    fn read_enabled(&self) -> Result<Option<bool>, InjectorError>;
}

/// Bundled manifest documents.
pub trait ManifestSource {
    fn card_manifest(&self) -> Result<CardManifest, InjectorError>;
    fn item_manifest(&self) -> Result<ItemManifest, InjectorError>;
}

/// Sequences the startup loads ahead of any scanning.
pub struct Bootstrap;

impl Bootstrap {
    /// `Ok(None)` when the toggle is off: no index is built and nothing is
    /// observed. Load failures propagate before the document is touched.
    pub fn start(
        flags: &dyn FlagStore,
        source: &dyn ManifestSource,
        config: EngineConfig,
    ) -> Result<Option<Injector>, InjectorError> {
        if flags.read_enabled()? == Some(false) {
            tracing::info!("card injection disabled");
            return Ok(None);
        }
        let cards = source.card_manifest()?;
        tracing::info!("loaded ability cards: {} characters", cards.characters.len());
        let items = source.item_manifest()?;
        let index = LookupIndex::build(&cards, &items);
        tracing::info!("loaded item cards: {} items", index.item_count());
        Ok(Some(Injector::new(index, config)))
    }
}

/// Owns the built index and the watcher for one document session.
#[derive(Debug)]
pub struct Injector {
    index: LookupIndex,
    config: EngineConfig,
    watcher: MutationWatcher,
    events: EventBus,
}

impl Injector {
    pub fn new(index: LookupIndex, config: EngineConfig) -> Self {
        Self {
            index,
            config,
            watcher: MutationWatcher::new(),
            events: EventBus::default(),
        }
    }

    pub fn index(&self) -> &LookupIndex {
        &self.index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> WatchState {
        self.watcher.state()
    }

    /// Full scan of the document, then start observing it. Returns how many
    /// nodes the scan changed.
    pub fn attach(&mut self, doc: &mut Document) -> usize {
        let pipeline = Pipeline::new(&self.index, &self.config);
        let root = doc.root();
        let changed = pipeline.scan(doc, root, &mut self.events);
        self.watcher.start(doc);
        tracing::info!("active and watching for cards ({changed} patched on load)");
        changed
    }

    /// Handles pending mutation records until the document is quiet.
    pub fn pump(&mut self, doc: &mut Document) -> usize {
        let pipeline = Pipeline::new(&self.index, &self.config);
        self.watcher.settle(
            &pipeline,
            doc,
            &mut self.events,
            self.config.max_settle_rounds,
        )
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain().collect()
    }
}
