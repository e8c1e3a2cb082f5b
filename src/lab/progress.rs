//! Section progress
//!
//! Status is recomputed from scratch on every update, so clearing a field
//! can move a section backwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::analysis::AnalysisEntries;
use super::trial::TrialBook;
use super::validation::{FieldStatus, ValidationEngine};
use crate::consts::TRIALS_PER_MODE;
use crate::sim::CollisionMode;

/// Lab sections shown in the course outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Simulation,
    OneDimensional,
    TwoDimensional,
    Analysis,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Simulation,
        Section::OneDimensional,
        Section::TwoDimensional,
        Section::Analysis,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectionStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Completion of one section
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionProgress {
    pub status: SectionStatus,
    /// Correct (or committed) share of the section, 0..=1
    pub completion: f64,
}

impl SectionProgress {
    /// Roll a set of field statuses up into a section status
    pub fn from_fields(statuses: &[FieldStatus]) -> Self {
        if statuses.is_empty() {
            return Self::default();
        }
        let filled = statuses.iter().filter(|s| s.is_filled()).count();
        let correct = statuses.iter().filter(|s| s.is_correct()).count();
        Self::from_counts(filled, correct, statuses.len())
    }

    fn from_counts(started: usize, done: usize, total: usize) -> Self {
        let status = if done == total {
            SectionStatus::Completed
        } else if started == 0 {
            SectionStatus::NotStarted
        } else {
            SectionStatus::InProgress
        };
        Self {
            status,
            completion: done as f64 / total as f64,
        }
    }
}

pub type SectionStatusMap = BTreeMap<Section, SectionProgress>;

/// Instructor-awarded points per section
pub type SectionScores = BTreeMap<Section, f64>;

/// Derives per-section status from trials and entries
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressTracker {
    pub engine: ValidationEngine,
}

impl ProgressTracker {
    pub fn new(engine: ValidationEngine) -> Self {
        Self { engine }
    }

    pub fn section(
        &self,
        section: Section,
        book: &TrialBook,
        analysis: &AnalysisEntries,
    ) -> SectionProgress {
        match section {
            Section::Simulation => {
                // Three committed trials of each type; no typed fields here
                let per_mode = TRIALS_PER_MODE as usize;
                let one_d = book.committed_count(CollisionMode::OneD).min(per_mode);
                let two_d = book.committed_count(CollisionMode::TwoD).min(per_mode);
                SectionProgress::from_counts(one_d + two_d, one_d + two_d, per_mode * 2)
            }
            Section::OneDimensional => self.trial_section(CollisionMode::OneD, book),
            Section::TwoDimensional => self.trial_section(CollisionMode::TwoD, book),
            Section::Analysis => {
                let statuses: Vec<FieldStatus> = AnalysisEntries::fields()
                    .into_iter()
                    .map(|f| analysis.status(f, book, &self.engine))
                    .collect();
                SectionProgress::from_fields(&statuses)
            }
        }
    }

    pub fn all(&self, book: &TrialBook, analysis: &AnalysisEntries) -> SectionStatusMap {
        Section::ALL
            .into_iter()
            .map(|s| (s, self.section(s, book, analysis)))
            .collect()
    }

    fn trial_section(&self, mode: CollisionMode, book: &TrialBook) -> SectionProgress {
        let statuses: Vec<FieldStatus> = book
            .of_mode(mode)
            .flat_map(|trial| {
                trial
                    .fields()
                    .into_iter()
                    .map(move |f| trial.status(f, &self.engine))
            })
            .collect();
        SectionProgress::from_fields(&statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::trial::{Axis, BodyReading, EntryField, InstrumentReadings, Phase, Puck};

    fn reading(p: f64) -> BodyReading {
        BodyReading {
            mass_grams: 505.0,
            spacing_cm: 0.0,
            interval_s: 0.1,
            speed_cm_s: 0.0,
            angle_deg: None,
            momentum_x: p,
            momentum_y: None,
        }
    }

    fn commit_all(book: &mut TrialBook, mode: CollisionMode) {
        for n in 1..=TRIALS_PER_MODE {
            if let Some(trial) = book.get_mut(mode, n) {
                trial.readings = Some(InstrumentReadings {
                    frame: 1,
                    before: [reading(10.0), reading(0.0)],
                    after: [reading(1.0), reading(9.0)],
                });
            }
        }
    }

    #[test]
    fn test_empty_lab_not_started() {
        let map = ProgressTracker::default().all(&TrialBook::new(), &AnalysisEntries::default());
        assert_eq!(map.len(), 4);
        assert!(map.values().all(|p| p.status == SectionStatus::NotStarted));
    }

    #[test]
    fn test_simulation_needs_six_commits() {
        let tracker = ProgressTracker::default();
        let analysis = AnalysisEntries::default();
        let mut book = TrialBook::new();

        commit_all(&mut book, CollisionMode::OneD);
        let progress = tracker.section(Section::Simulation, &book, &analysis);
        assert_eq!(progress.status, SectionStatus::InProgress);
        assert!((progress.completion - 0.5).abs() < 1e-12);

        commit_all(&mut book, CollisionMode::TwoD);
        let progress = tracker.section(Section::Simulation, &book, &analysis);
        assert_eq!(progress.status, SectionStatus::Completed);
    }

    #[test]
    fn test_trial_section_regresses_when_cleared() {
        let tracker = ProgressTracker::default();
        let analysis = AnalysisEntries::default();
        let mut book = TrialBook::new();
        commit_all(&mut book, CollisionMode::OneD);

        let values = [
            (EntryField::Momentum { puck: Puck::A, phase: Phase::Before, axis: Axis::X }, 10.0),
            (EntryField::Momentum { puck: Puck::B, phase: Phase::Before, axis: Axis::X }, 0.0),
            (EntryField::Momentum { puck: Puck::A, phase: Phase::After, axis: Axis::X }, 1.0),
            (EntryField::Momentum { puck: Puck::B, phase: Phase::After, axis: Axis::X }, 9.0),
            (EntryField::Total { phase: Phase::Before, axis: Axis::X }, 10.0),
            (EntryField::Total { phase: Phase::After, axis: Axis::X }, 10.0),
            (EntryField::PercentDifference { axis: Axis::X }, 0.0),
        ];
        for n in 1..=TRIALS_PER_MODE {
            let trial = book.get_mut(CollisionMode::OneD, n).unwrap();
            for (field, value) in values {
                trial.entries.set(field, Some(value));
            }
        }
        let progress = tracker.section(Section::OneDimensional, &book, &analysis);
        assert_eq!(progress.status, SectionStatus::Completed);
        assert_eq!(progress.completion, 1.0);

        book.get_mut(CollisionMode::OneD, 2)
            .unwrap()
            .entries
            .set(values[0].0, None);
        let progress = tracker.section(Section::OneDimensional, &book, &analysis);
        assert_eq!(progress.status, SectionStatus::InProgress);
        assert!(progress.completion < 1.0);
    }

    #[test]
    fn test_wrong_answers_keep_section_in_progress() {
        let tracker = ProgressTracker::default();
        let mut analysis = AnalysisEntries::default();
        let book = TrialBook::new();
        for field in AnalysisEntries::fields() {
            analysis.set(field, Some(3.0));
        }
        let progress = tracker.section(Section::Analysis, &book, &analysis);
        assert_eq!(progress.status, SectionStatus::InProgress);
        assert_eq!(progress.completion, 0.0);
    }
}
