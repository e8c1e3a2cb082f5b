//! In-process document store
//!
//! Stands in for a realtime document database: merges saves into one
//! document and pushes deliveries to subscribers.

use super::{LabStatePatch, LabStore, OnData, PersistError, PersistedLabState, SubscriptionId};

#[derive(Default)]
pub struct MemoryStore {
    document: Option<PersistedLabState>,
    subscribers: Vec<(SubscriptionId, OnData)>,
    next_id: u64,
    /// When set, every save fails (simulates a dropped connection)
    offline: bool,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("document", &self.document)
            .field("subscribers", &self.subscribers.len())
            .field("offline", &self.offline)
            .finish()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an existing document
    pub fn with_document(document: PersistedLabState) -> Self {
        Self {
            document: Some(document),
            ..Self::default()
        }
    }

    pub fn document(&self) -> Option<&PersistedLabState> {
        self.document.as_ref()
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Replace the document from outside (another device) and notify everyone
    pub fn replace(&mut self, document: PersistedLabState) {
        for (_, on_data) in self.subscribers.iter_mut() {
            on_data(&document);
        }
        self.document = Some(document);
    }
}

impl LabStore for MemoryStore {
    fn save(&mut self, patch: LabStatePatch) -> Result<(), PersistError> {
        if self.offline {
            return Err(PersistError::Unavailable("store is offline".to_string()));
        }
        // Writers are not echoed; only `replace` notifies
        self.document.get_or_insert_with(PersistedLabState::default).apply(patch);
        Ok(())
    }

    fn subscribe(&mut self, mut on_data: OnData) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        if let Some(document) = &self.document {
            on_data(document);
        }
        self.subscribers.push((id, on_data));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub, _)| *sub != id);
    }
}
