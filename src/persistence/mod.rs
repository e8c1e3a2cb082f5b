//! Lab persistence collaborator
//!
//! Features:
//! - Versioned JSON document (trials, analysis entries, simulation snapshot,
//!   section status, awarded points)
//! - Partial saves that merge into the stored document
//! - Subscription for the initial load / remote updates
//! - In-memory and JSON-file stores
//!
//! Saves are fire-and-forget from the session's point of view: failures are
//! reported, never retried inline, and never roll back in-memory state.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::lab::analysis::AnalysisEntries;
use crate::lab::progress::{SectionScores, SectionStatusMap};
use crate::lab::trial::Trial;
use crate::sim::SimulationState;

/// Current document format version
pub const DOCUMENT_VERSION: u32 = 1;

/// Everything the store mirrors for one lab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedLabState {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub trials: Vec<Trial>,
    #[serde(default)]
    pub analysis: AnalysisEntries,
    #[serde(default)]
    pub simulation: Option<SimulationState>,
    #[serde(default)]
    pub section_status: SectionStatusMap,
    #[serde(default)]
    pub scores: SectionScores,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl Default for PersistedLabState {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            trials: Vec::new(),
            analysis: AnalysisEntries::default(),
            simulation: None,
            section_status: SectionStatusMap::new(),
            scores: SectionScores::new(),
        }
    }
}

impl PersistedLabState {
    /// Merge a partial update into this document
    pub fn apply(&mut self, patch: LabStatePatch) {
        if let Some(trials) = patch.trials {
            self.trials = trials;
        }
        if let Some(analysis) = patch.analysis {
            self.analysis = analysis;
        }
        if let Some(simulation) = patch.simulation {
            self.simulation = Some(simulation);
        }
        if let Some(section_status) = patch.section_status {
            self.section_status = section_status;
        }
        if let Some(scores) = patch.scores {
            self.scores = scores;
        }
    }
}

/// Partial document update; `None` fields are left as stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabStatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trials: Option<Vec<Trial>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisEntries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_status: Option<SectionStatusMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<SectionScores>,
}

impl LabStatePatch {
    pub fn is_empty(&self) -> bool {
        self.trials.is_none()
            && self.analysis.is_none()
            && self.simulation.is_none()
            && self.section_status.is_none()
            && self.scores.is_none()
    }

    /// Fold a later patch into this one (later fields win)
    pub fn merge(&mut self, later: LabStatePatch) {
        if later.trials.is_some() {
            self.trials = later.trials;
        }
        if later.analysis.is_some() {
            self.analysis = later.analysis;
        }
        if later.simulation.is_some() {
            self.simulation = later.simulation;
        }
        if later.section_status.is_some() {
            self.section_status = later.section_status;
        }
        if later.scores.is_some() {
            self.scores = later.scores;
        }
    }
}

/// Handle returned by `LabStore::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Callback invoked with each delivered document
pub type OnData = Box<dyn FnMut(&PersistedLabState)>;

/// External document store for lab state
pub trait LabStore {
    /// Merge a partial update into the stored document
    fn save(&mut self, patch: LabStatePatch) -> Result<(), PersistError>;

    /// Register for document deliveries. Stores deliver the current document
    /// (if any) as the initial load; repeated deliveries are the store's call.
    fn subscribe(&mut self, on_data: OnData) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// Persistence errors
#[derive(Debug)]
pub enum PersistError {
    /// Standard I/O error
    Io(std::io::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
    /// Store refused or could not be reached
    Unavailable(String),
    /// Stored document is from a newer format
    UnsupportedVersion(u32),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "IO error: {e}"),
            PersistError::Json(e) => write!(f, "JSON error: {e}"),
            PersistError::Unavailable(why) => write!(f, "store unavailable: {why}"),
            PersistError::UnsupportedVersion(v) => {
                write!(f, "unsupported lab document version: {v}")
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(e) => Some(e),
            PersistError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Json(e)
    }
}

/// Parse a stored document, rejecting newer formats
pub fn decode_document(json: &str) -> Result<PersistedLabState, PersistError> {
    let doc: PersistedLabState = serde_json::from_str(json)?;
    if doc.version > DOCUMENT_VERSION {
        return Err(PersistError::UnsupportedVersion(doc.version));
    }
    Ok(doc)
}

pub fn encode_document(doc: &PersistedLabState) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::progress::{Section, SectionProgress, SectionStatus};
    use crate::lab::trial::TrialBook;

    #[test]
    fn test_patch_merges_into_document() {
        let mut doc = PersistedLabState::default();
        doc.apply(LabStatePatch {
            trials: Some(TrialBook::new().trials),
            ..Default::default()
        });
        assert_eq!(doc.trials.len(), 6);

        let mut status = SectionStatusMap::new();
        status.insert(
            Section::Simulation,
            SectionProgress {
                status: SectionStatus::InProgress,
                completion: 0.5,
            },
        );
        doc.apply(LabStatePatch {
            section_status: Some(status.clone()),
            ..Default::default()
        });
        assert_eq!(doc.trials.len(), 6);
        assert_eq!(doc.section_status, status);
    }

    #[test]
    fn test_patch_merge_later_wins() {
        let mut patch = LabStatePatch {
            trials: Some(Vec::new()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.merge(LabStatePatch {
            trials: Some(TrialBook::new().trials),
            ..Default::default()
        });
        assert_eq!(patch.trials.map(|t| t.len()), Some(6));
        assert!(LabStatePatch::default().is_empty());
    }

    #[test]
    fn test_document_json_round_trip() {
        let mut doc = PersistedLabState {
            trials: TrialBook::new().trials,
            ..Default::default()
        };
        doc.section_status
            .insert(Section::Analysis, SectionProgress::default());
        let json = encode_document(&doc).unwrap();
        assert!(json.contains("\"Analysis\""));
        assert_eq!(decode_document(&json).unwrap(), doc);
    }

    #[test]
    fn test_readings_survive_json_exactly() {
        use crate::lab::trial::{BodyReading, InstrumentReadings};
        use crate::sim::CollisionMode;

        let reading = BodyReading {
            mass_grams: 505.0,
            spacing_cm: 2.4,
            interval_s: 0.1,
            speed_cm_s: 24.0,
            angle_deg: Some(4.999999999999999),
            momentum_x: 0.4485981403642037,
            momentum_y: Some(-0.1 - 0.2),
        };
        let mut trials = TrialBook::new().trials;
        trials[0].readings = Some(InstrumentReadings {
            frame: 93,
            before: [reading; 2],
            after: [reading; 2],
        });
        assert_eq!(trials[0].mode, CollisionMode::OneD);
        let doc = PersistedLabState {
            trials,
            ..Default::default()
        };
        let decoded = decode_document(&encode_document(&doc).unwrap()).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = r#"{ "version": 99 }"#;
        assert!(matches!(
            decode_document(json),
            Err(PersistError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_missing_fields_default() {
        let doc = decode_document("{}").unwrap();
        assert_eq!(doc.version, DOCUMENT_VERSION);
        assert!(doc.trials.is_empty());
        assert!(doc.scores.is_empty());
    }
}
