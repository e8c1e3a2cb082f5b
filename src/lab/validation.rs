//! Answer validation against tolerance bands
//!
//! One comparator for every numeric field. Each field only differs in where
//! its correct value comes from, so callers pass that in as a supplier.

use serde::{Deserialize, Serialize};

use crate::consts::{ABSOLUTE_TOLERANCE, RELATIVE_TOLERANCE};

/// Acceptable deviation: `|value - correct| <= max(|correct| * relative, absolute)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSpec {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for ToleranceSpec {
    fn default() -> Self {
        Self {
            relative: RELATIVE_TOLERANCE,
            absolute: ABSOLUTE_TOLERANCE,
        }
    }
}

impl ToleranceSpec {
    /// Half-width of the band around `correct`
    pub fn band(&self, correct: f64) -> f64 {
        (correct.abs() * self.relative).max(self.absolute)
    }

    pub fn accepts(&self, value: f64, correct: f64) -> bool {
        if !value.is_finite() || !correct.is_finite() {
            return false;
        }
        (value - correct).abs() <= self.band(correct)
    }
}

/// Grade with the lab's standard tolerance
#[inline]
pub fn is_valid(entered: f64, correct: f64) -> bool {
    ToleranceSpec::default().accepts(entered, correct)
}

/// Outcome of checking one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldStatus {
    /// Nothing entered
    Empty,
    /// Value entered but nothing to check it against yet
    Unchecked,
    Correct,
    Incorrect,
}

impl FieldStatus {
    pub fn is_filled(&self) -> bool {
        !matches!(self, FieldStatus::Empty)
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, FieldStatus::Correct)
    }
}

/// Tolerance comparator parameterized by a correct-value supplier
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine {
    pub tolerance: ToleranceSpec,
}

impl ValidationEngine {
    pub fn new(tolerance: ToleranceSpec) -> Self {
        Self { tolerance }
    }

    /// Check an entry. The supplier is only consulted when a value is present.
    pub fn check<F>(&self, entered: Option<f64>, correct: F) -> FieldStatus
    where
        F: FnOnce() -> Option<f64>,
    {
        let Some(value) = entered else {
            return FieldStatus::Empty;
        };
        match correct() {
            Some(correct) if self.tolerance.accepts(value, correct) => FieldStatus::Correct,
            Some(_) => FieldStatus::Incorrect,
            None => FieldStatus::Unchecked,
        }
    }

    /// Value of an entry only if it grades correct against `correct`
    pub fn validated(&self, entered: Option<f64>, correct: Option<f64>) -> Option<f64> {
        let value = entered?;
        self.tolerance.accepts(value, correct?).then_some(value)
    }
}
