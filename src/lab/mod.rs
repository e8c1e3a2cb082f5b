//! Lab worksheet
//!
//! Everything between the air table and the grader:
//! - Recording a captured collision into a numbered trial
//! - Parsing and checking the student's typed answers
//! - Analysis averages and per-section progress
//! - The `LabSession` that ties simulation, worksheet and store together

pub mod analysis;
pub mod entry;
pub mod error;
pub mod progress;
pub mod recorder;
pub mod session;
pub mod trial;
pub mod validation;

pub use analysis::{AnalysisEntries, AnalysisField};
pub use entry::{EntryRules, parse_entry};
pub use error::LabError;
pub use progress::{
    ProgressTracker, Section, SectionProgress, SectionScores, SectionStatus, SectionStatusMap,
};
pub use recorder::commit_to_trial;
pub use session::{LabSession, Notification, NotificationLevel, Submission};
pub use trial::{
    Axis, AxisValues, BodyReading, EntryField, InstrumentReadings, Phase, Puck, Trial, TrialBook,
    axes,
};
pub use validation::{FieldStatus, ToleranceSpec, ValidationEngine, is_valid};
