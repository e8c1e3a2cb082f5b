//! JSON file store
//!
//! Writes go to a temporary file first and are renamed over the document,
//! so a crash mid-write leaves the previous save intact.

use std::path::{Path, PathBuf};

use super::{
    LabStatePatch, LabStore, OnData, PersistError, PersistedLabState, SubscriptionId,
    decode_document, encode_document,
};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    next_id: u64,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            next_id: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored document; `Ok(None)` if nothing was saved yet
    pub fn load(&self) -> Result<Option<PersistedLabState>, PersistError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => decode_document(&json).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, document: &PersistedLabState) -> Result<(), PersistError> {
        let json = encode_document(document)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LabStore for JsonFileStore {
    fn save(&mut self, patch: LabStatePatch) -> Result<(), PersistError> {
        let mut document = self.load()?.unwrap_or_default();
        document.apply(patch);
        self.write(&document)?;
        log::debug!("Lab state saved to {}", self.path.display());
        Ok(())
    }

    fn subscribe(&mut self, mut on_data: OnData) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        match self.load() {
            Ok(Some(document)) => {
                log::info!("Loaded lab state from {}", self.path.display());
                on_data(&document);
            }
            Ok(None) => log::info!("No saved lab state at {}", self.path.display()),
            Err(e) => log::warn!("Could not load {}: {e}", self.path.display()),
        }
        id
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) {
        // Files only deliver the initial load
    }
}
