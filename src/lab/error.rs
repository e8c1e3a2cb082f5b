use crate::sim::CollisionMode;

/// Non-fatal lab errors surfaced to the student
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabError {
    /// Commit requested with no fresh collision (none yet, or already used)
    NoCollisionData,
    /// Trial number outside 1..=TRIALS_PER_MODE
    UnknownTrial { mode: CollisionMode, number: u32 },
}

impl std::fmt::Display for LabError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCollisionData => write!(
                f,
                "no collision data available: run a new collision before recording a trial"
            ),
            Self::UnknownTrial { mode, number } => {
                write!(f, "no {} trial numbered {number}", mode.as_str())
            }
        }
    }
}

impl std::error::Error for LabError {}
