//! The engine's shared-collaborator bundle.

use std::sync::Arc;

use trek_search::PathRecordManager;
use trek_terrain::TerrainStore;

use crate::events::{EventSink, NoopSink};

/// Everything sessions and the dispatcher share, passed explicitly at
/// construction.
///
/// There is deliberately no ambient registry: a test builds a context with a
/// throwaway store, two engines in one process stay fully separate, and
/// every collaborator a component touches is visible at its call site.
/// Cloning is cheap — all members are `Arc`s.
#[derive(Clone)]
pub struct EngineContext {
    store: Arc<TerrainStore>,
    records: Option<Arc<dyn PathRecordManager>>,
    events: Arc<dyn EventSink>,
}

impl EngineContext {
    /// A context with no record manager and a discarding event sink.
    pub fn new(store: Arc<TerrainStore>) -> Self {
        Self {
            store,
            records: None,
            events: Arc::new(NoopSink),
        }
    }

    /// Attach the path-record collaborator; completed legs will be offered
    /// to it and looked up before searching.
    pub fn with_records(mut self, records: Arc<dyn PathRecordManager>) -> Self {
        self.records = Some(records);
        self
    }

    /// Attach the diagnostic event sink.
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    #[inline]
    pub fn store(&self) -> &Arc<TerrainStore> {
        &self.store
    }

    #[inline]
    pub fn records(&self) -> Option<&Arc<dyn PathRecordManager>> {
        self.records.as_ref()
    }

    #[inline]
    pub fn events(&self) -> &Arc<dyn EventSink> {
        &self.events
    }
}
