//! Trial records
//!
//! A trial holds the instrument readings written by the recorder and the
//! numbers the student typed in. Readings are only ever replaced by a new
//! commit; entries stay editable.

use serde::{Deserialize, Serialize};

use super::validation::{FieldStatus, ValidationEngine};
use crate::consts::TRIALS_PER_MODE;
use crate::momentum::percent_difference;
use crate::sim::CollisionMode;

/// Which puck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Puck {
    A,
    B,
}

impl Puck {
    pub const BOTH: [Puck; 2] = [Puck::A, Puck::B];

    pub fn index(self) -> usize {
        match self {
            Puck::A => 0,
            Puck::B => 1,
        }
    }
}

/// Before or after the collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Before,
    After,
}

impl Phase {
    pub const BOTH: [Phase; 2] = [Phase::Before, Phase::After];
}

/// Momentum component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// Axes graded for a collision type
pub fn axes(mode: CollisionMode) -> &'static [Axis] {
    match mode {
        CollisionMode::OneD => &[Axis::X],
        CollisionMode::TwoD => &[Axis::X, Axis::Y],
    }
}

/// Optional per-axis values (1-D uses x only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisValues {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl AxisValues {
    pub fn get(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn set(&mut self, axis: Axis, value: Option<f64>) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }
}

/// What the spark-timer sheet says about one puck at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyReading {
    pub mass_grams: f64,
    /// Inferred distance between spark marks (cm)
    pub spacing_cm: f64,
    /// Time between spark marks (s)
    pub interval_s: f64,
    pub speed_cm_s: f64,
    /// Direction of travel above horizontal (degrees); 2-D only
    pub angle_deg: Option<f64>,
    /// kg·cm/s; signed scalar in 1-D
    pub momentum_x: f64,
    /// kg·cm/s; 2-D only
    pub momentum_y: Option<f64>,
}

impl BodyReading {
    pub fn momentum(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::X => Some(self.momentum_x),
            Axis::Y => self.momentum_y,
        }
    }
}

/// Readings for both pucks before and after one collision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentReadings {
    /// Simulation frame of the collision
    pub frame: u64,
    pub before: [BodyReading; 2],
    pub after: [BodyReading; 2],
}

impl InstrumentReadings {
    pub fn body(&self, phase: Phase, puck: Puck) -> &BodyReading {
        match phase {
            Phase::Before => &self.before[puck.index()],
            Phase::After => &self.after[puck.index()],
        }
    }

    /// Instrument total momentum on one axis
    pub fn total(&self, phase: Phase, axis: Axis) -> Option<f64> {
        let a = self.body(phase, Puck::A).momentum(axis)?;
        let b = self.body(phase, Puck::B).momentum(axis)?;
        Some(a + b)
    }

    /// Percent difference of the instrument totals
    pub fn percent_difference(&self, axis: Axis) -> Option<f64> {
        percent_difference(self.total(Phase::Before, axis)?, self.total(Phase::After, axis)?)
    }
}

/// A student-editable numeric field inside a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryField {
    Momentum { puck: Puck, phase: Phase, axis: Axis },
    Total { phase: Phase, axis: Axis },
    PercentDifference { axis: Axis },
}

/// Numbers typed in for one trial
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialEntries {
    pub momentum_before: [AxisValues; 2],
    pub momentum_after: [AxisValues; 2],
    pub total_before: AxisValues,
    pub total_after: AxisValues,
    pub percent_difference: AxisValues,
}

impl TrialEntries {
    fn slot(&self, field: EntryField) -> (&AxisValues, Axis) {
        match field {
            EntryField::Momentum { puck, phase: Phase::Before, axis } => {
                (&self.momentum_before[puck.index()], axis)
            }
            EntryField::Momentum { puck, phase: Phase::After, axis } => {
                (&self.momentum_after[puck.index()], axis)
            }
            EntryField::Total { phase: Phase::Before, axis } => (&self.total_before, axis),
            EntryField::Total { phase: Phase::After, axis } => (&self.total_after, axis),
            EntryField::PercentDifference { axis } => (&self.percent_difference, axis),
        }
    }

    fn slot_mut(&mut self, field: EntryField) -> (&mut AxisValues, Axis) {
        match field {
            EntryField::Momentum { puck, phase: Phase::Before, axis } => {
                (&mut self.momentum_before[puck.index()], axis)
            }
            EntryField::Momentum { puck, phase: Phase::After, axis } => {
                (&mut self.momentum_after[puck.index()], axis)
            }
            EntryField::Total { phase: Phase::Before, axis } => (&mut self.total_before, axis),
            EntryField::Total { phase: Phase::After, axis } => (&mut self.total_after, axis),
            EntryField::PercentDifference { axis } => (&mut self.percent_difference, axis),
        }
    }

    pub fn get(&self, field: EntryField) -> Option<f64> {
        let (row, axis) = self.slot(field);
        row.get(axis)
    }

    pub fn set(&mut self, field: EntryField, value: Option<f64>) {
        let (row, axis) = self.slot_mut(field);
        row.set(axis, value);
    }
}

/// One before/after collision dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub mode: CollisionMode,
    /// 1-based within its collision type
    pub number: u32,
    pub readings: Option<InstrumentReadings>,
    #[serde(default)]
    pub entries: TrialEntries,
}

impl Trial {
    pub fn new(mode: CollisionMode, number: u32) -> Self {
        Self {
            mode,
            number,
            readings: None,
            entries: TrialEntries::default(),
        }
    }

    pub fn is_committed(&self) -> bool {
        self.readings.is_some()
    }

    /// Every entry field of this trial, in sheet order
    pub fn fields(&self) -> Vec<EntryField> {
        let mut fields = Vec::new();
        for &phase in &Phase::BOTH {
            for &puck in &Puck::BOTH {
                for &axis in axes(self.mode) {
                    fields.push(EntryField::Momentum { puck, phase, axis });
                }
            }
        }
        for &phase in &Phase::BOTH {
            for &axis in axes(self.mode) {
                fields.push(EntryField::Total { phase, axis });
            }
        }
        for &axis in axes(self.mode) {
            fields.push(EntryField::PercentDifference { axis });
        }
        fields
    }

    /// Whether this trial has a field (y fields do not exist in 1-D)
    pub fn has_field(&self, field: EntryField) -> bool {
        let axis = match field {
            EntryField::Momentum { axis, .. }
            | EntryField::Total { axis, .. }
            | EntryField::PercentDifference { axis } => axis,
        };
        axes(self.mode).contains(&axis)
    }

    /// The value a field should hold, if it can be derived yet.
    ///
    /// Momenta come from the instrument readings. Totals are the sum of the
    /// student's own per-puck entries once both of those check out, and the
    /// percent difference follows from the student's validated totals.
    pub fn correct_value(&self, field: EntryField, engine: &ValidationEngine) -> Option<f64> {
        if !self.has_field(field) {
            return None;
        }
        match field {
            EntryField::Momentum { puck, phase, axis } => {
                self.readings.as_ref()?.body(phase, puck).momentum(axis)
            }
            EntryField::Total { phase, axis } => {
                let a = self.validated(EntryField::Momentum { puck: Puck::A, phase, axis }, engine)?;
                let b = self.validated(EntryField::Momentum { puck: Puck::B, phase, axis }, engine)?;
                Some(a + b)
            }
            EntryField::PercentDifference { axis } => {
                let before = self.validated(EntryField::Total { phase: Phase::Before, axis }, engine)?;
                let after = self.validated(EntryField::Total { phase: Phase::After, axis }, engine)?;
                percent_difference(before, after)
            }
        }
    }

    /// Entered value of a field, only if it grades correct
    pub fn validated(&self, field: EntryField, engine: &ValidationEngine) -> Option<f64> {
        engine.validated(self.entries.get(field), self.correct_value(field, engine))
    }

    pub fn status(&self, field: EntryField, engine: &ValidationEngine) -> FieldStatus {
        engine.check(self.entries.get(field), || self.correct_value(field, engine))
    }
}

/// The lab's full set of trials: three per collision type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBook {
    pub trials: Vec<Trial>,
}

impl Default for TrialBook {
    fn default() -> Self {
        Self::new()
    }
}

impl TrialBook {
    pub fn new() -> Self {
        let trials = [CollisionMode::OneD, CollisionMode::TwoD]
            .into_iter()
            .flat_map(|mode| (1..=TRIALS_PER_MODE).map(move |n| Trial::new(mode, n)))
            .collect();
        Self { trials }
    }

    pub fn get(&self, mode: CollisionMode, number: u32) -> Option<&Trial> {
        self.trials
            .iter()
            .find(|t| t.mode == mode && t.number == number)
    }

    pub fn get_mut(&mut self, mode: CollisionMode, number: u32) -> Option<&mut Trial> {
        self.trials
            .iter_mut()
            .find(|t| t.mode == mode && t.number == number)
    }

    pub fn of_mode(&self, mode: CollisionMode) -> impl Iterator<Item = &Trial> {
        self.trials.iter().filter(move |t| t.mode == mode)
    }

    pub fn committed_count(&self, mode: CollisionMode) -> usize {
        self.of_mode(mode).filter(|t| t.is_committed()).count()
    }

    /// Percent differences the student entered for one mode and axis
    pub fn entered_percent_differences(&self, mode: CollisionMode, axis: Axis) -> Vec<f64> {
        self.of_mode(mode)
            .filter_map(|t| t.entries.get(EntryField::PercentDifference { axis }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(momentum_x: f64, momentum_y: Option<f64>) -> BodyReading {
        BodyReading {
            mass_grams: 505.0,
            spacing_cm: 0.0,
            interval_s: 0.1,
            speed_cm_s: 0.0,
            angle_deg: None,
            momentum_x,
            momentum_y,
        }
    }

    fn one_d_trial() -> Trial {
        let mut trial = Trial::new(CollisionMode::OneD, 1);
        trial.readings = Some(InstrumentReadings {
            frame: 60,
            before: [reading(12.12, None), reading(0.0, None)],
            after: [reading(0.61, None), reading(11.51, None)],
        });
        trial
    }

    fn momentum(puck: Puck, phase: Phase) -> EntryField {
        EntryField::Momentum {
            puck,
            phase,
            axis: Axis::X,
        }
    }

    #[test]
    fn test_field_counts() {
        assert_eq!(Trial::new(CollisionMode::OneD, 1).fields().len(), 7);
        assert_eq!(Trial::new(CollisionMode::TwoD, 1).fields().len(), 14);
    }

    #[test]
    fn test_book_layout() {
        let book = TrialBook::new();
        assert_eq!(book.trials.len(), 6);
        assert!(book.get(CollisionMode::TwoD, 3).is_some());
        assert!(book.get(CollisionMode::OneD, 4).is_none());
        assert_eq!(book.committed_count(CollisionMode::OneD), 0);
    }

    #[test]
    fn test_entries_get_set() {
        let mut entries = TrialEntries::default();
        let field = EntryField::Total {
            phase: Phase::After,
            axis: Axis::Y,
        };
        entries.set(field, Some(3.5));
        assert_eq!(entries.get(field), Some(3.5));
        assert_eq!(entries.total_after.y, Some(3.5));
        entries.set(EntryField::PercentDifference { axis: Axis::X }, Some(1.0));
        assert_eq!(entries.percent_difference.x, Some(1.0));
    }

    #[test]
    fn test_momentum_graded_against_readings() {
        let engine = ValidationEngine::default();
        let mut trial = one_d_trial();
        let field = momentum(Puck::A, Phase::Before);
        trial.entries.set(field, Some(12.0));
        assert_eq!(trial.status(field, &engine), FieldStatus::Correct);
        trial.entries.set(field, Some(10.0));
        assert_eq!(trial.status(field, &engine), FieldStatus::Incorrect);
    }

    #[test]
    fn test_uncommitted_trial_is_unchecked() {
        let engine = ValidationEngine::default();
        let mut trial = Trial::new(CollisionMode::OneD, 2);
        let field = momentum(Puck::B, Phase::After);
        trial.entries.set(field, Some(1.0));
        assert_eq!(trial.status(field, &engine), FieldStatus::Unchecked);
    }

    #[test]
    fn test_totals_use_validated_entries() {
        let engine = ValidationEngine::default();
        let mut trial = one_d_trial();
        let total = EntryField::Total {
            phase: Phase::After,
            axis: Axis::X,
        };
        trial.entries.set(total, Some(12.1));
        // Per-puck entries missing: nothing to grade the total against
        assert_eq!(trial.status(total, &engine), FieldStatus::Unchecked);

        trial.entries.set(momentum(Puck::A, Phase::After), Some(0.6));
        trial.entries.set(momentum(Puck::B, Phase::After), Some(11.5));
        let correct = trial.correct_value(total, &engine).unwrap();
        assert!((correct - 12.1).abs() < 1e-9);
        assert_eq!(trial.status(total, &engine), FieldStatus::Correct);
    }

    #[test]
    fn test_percent_difference_chain() {
        let engine = ValidationEngine::default();
        let mut trial = one_d_trial();
        for (field, value) in [
            (momentum(Puck::A, Phase::Before), 12.12),
            (momentum(Puck::B, Phase::Before), 0.0),
            (momentum(Puck::A, Phase::After), 0.61),
            (momentum(Puck::B, Phase::After), 11.51),
            (EntryField::Total { phase: Phase::Before, axis: Axis::X }, 12.12),
            (EntryField::Total { phase: Phase::After, axis: Axis::X }, 12.12),
        ] {
            trial.entries.set(field, Some(value));
        }
        let pd = EntryField::PercentDifference { axis: Axis::X };
        trial.entries.set(pd, Some(0.0));
        assert_eq!(trial.status(pd, &engine), FieldStatus::Correct);
        for field in trial.fields() {
            assert!(trial.status(field, &engine).is_correct(), "{field:?}");
        }
    }

    #[test]
    fn test_y_fields_absent_in_one_d() {
        let trial = one_d_trial();
        let field = EntryField::Momentum {
            puck: Puck::A,
            phase: Phase::Before,
            axis: Axis::Y,
        };
        assert!(!trial.has_field(field));
        assert_eq!(trial.correct_value(field, &ValidationEngine::default()), None);
    }

    #[test]
    fn test_instrument_percent_difference() {
        let readings = one_d_trial().readings.unwrap();
        assert!((readings.total(Phase::Before, Axis::X).unwrap() - 12.12).abs() < 1e-12);
        assert!(readings.percent_difference(Axis::X).unwrap() < 1e-9);
        assert_eq!(readings.total(Phase::Before, Axis::Y), None);
    }
}
