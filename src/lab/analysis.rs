//! Analysis sheet: average percent difference per collision type

use serde::{Deserialize, Serialize};

use super::trial::{Axis, AxisValues, TrialBook, axes};
use super::validation::{FieldStatus, ValidationEngine};
use crate::momentum::mean;
use crate::sim::CollisionMode;

/// An analysis-sheet field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisField {
    AveragePercentDifference { mode: CollisionMode, axis: Axis },
}

/// Numbers typed into the analysis sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntries {
    pub average_1d: AxisValues,
    pub average_2d: AxisValues,
}

impl AnalysisEntries {
    pub fn get(&self, field: AnalysisField) -> Option<f64> {
        let AnalysisField::AveragePercentDifference { mode, axis } = field;
        match mode {
            CollisionMode::OneD => self.average_1d.get(axis),
            CollisionMode::TwoD => self.average_2d.get(axis),
        }
    }

    pub fn set(&mut self, field: AnalysisField, value: Option<f64>) {
        let AnalysisField::AveragePercentDifference { mode, axis } = field;
        match mode {
            CollisionMode::OneD => self.average_1d.set(axis, value),
            CollisionMode::TwoD => self.average_2d.set(axis, value),
        }
    }

    /// All analysis fields: 1-D x, then 2-D x and y
    pub fn fields() -> Vec<AnalysisField> {
        [CollisionMode::OneD, CollisionMode::TwoD]
            .into_iter()
            .flat_map(|mode| {
                axes(mode)
                    .iter()
                    .map(move |&axis| AnalysisField::AveragePercentDifference { mode, axis })
            })
            .collect()
    }

    pub fn has_field(field: AnalysisField) -> bool {
        let AnalysisField::AveragePercentDifference { mode, axis } = field;
        axes(mode).contains(&axis)
    }

    /// Mean of the per-trial percent differences entered for that mode/axis
    pub fn correct_value(field: AnalysisField, book: &TrialBook) -> Option<f64> {
        if !Self::has_field(field) {
            return None;
        }
        let AnalysisField::AveragePercentDifference { mode, axis } = field;
        mean(&book.entered_percent_differences(mode, axis))
    }

    pub fn status(
        &self,
        field: AnalysisField,
        book: &TrialBook,
        engine: &ValidationEngine,
    ) -> FieldStatus {
        engine.check(self.get(field), || Self::correct_value(field, book))
    }
}
