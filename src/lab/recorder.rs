//! Trial recorder
//!
//! Turns the run's captured collision into the readings a spark-timer sheet
//! would give, and writes them into a trial. Each capture can be used once.

use super::error::LabError;
use super::trial::{BodyReading, InstrumentReadings, TrialBook};
use crate::consts::{SPARK_INTERVAL_FRAMES, SPARK_INTERVAL_SECS, TRIALS_PER_MODE};
use crate::sim::{CollisionCapture, CollisionMode, SimulationState, VelocitySnapshot};
use crate::units::{momentum_x, momentum_y, pixels_to_cm};
use crate::{angle_from_horizontal, canvas_to_lab};

/// Spark-sheet reading for one puck velocity
pub fn body_reading(snapshot: &VelocitySnapshot, mode: CollisionMode) -> BodyReading {
    let spacing_cm = pixels_to_cm(snapshot.speed() * SPARK_INTERVAL_FRAMES as f64);
    let lab = canvas_to_lab(snapshot.velocity());

    let (angle_deg, momentum_y) = match mode {
        CollisionMode::OneD => (None, None),
        CollisionMode::TwoD => (
            Some(angle_from_horizontal(lab)),
            Some(momentum_y(snapshot.mass, lab.y)),
        ),
    };

    BodyReading {
        mass_grams: snapshot.mass,
        spacing_cm,
        interval_s: SPARK_INTERVAL_SECS,
        speed_cm_s: spacing_cm / SPARK_INTERVAL_SECS,
        angle_deg,
        momentum_x: momentum_x(snapshot.mass, lab.x),
        momentum_y,
    }
}

/// Readings for a captured collision
pub fn readings_for(capture: &CollisionCapture) -> InstrumentReadings {
    let read = |s: &VelocitySnapshot| body_reading(s, capture.mode);
    InstrumentReadings {
        frame: capture.frame,
        before: [read(&capture.before[0]), read(&capture.before[1])],
        after: [read(&capture.after[0]), read(&capture.after[1])],
    }
}

/// Write the pending collision into trial `number` of the capture's mode.
///
/// Fails without touching anything if there is no fresh capture or the
/// trial does not exist. Overwrites earlier readings in that trial; the
/// student's entries are left alone.
pub fn commit_to_trial(
    state: &mut SimulationState,
    book: &mut TrialBook,
    number: u32,
) -> Result<InstrumentReadings, LabError> {
    let capture = state.pending_capture().ok_or(LabError::NoCollisionData)?;
    let mode = capture.mode;
    if !(1..=TRIALS_PER_MODE).contains(&number) {
        return Err(LabError::UnknownTrial { mode, number });
    }
    let trial = book
        .get_mut(mode, number)
        .ok_or(LabError::UnknownTrial { mode, number })?;

    let readings = readings_for(capture);
    if trial.readings.is_some() {
        log::info!("Overwriting {} trial {number}", mode.as_str());
    }
    trial.readings = Some(readings);

    if let Some(capture) = state.capture.as_mut() {
        capture.committed = true;
    }
    log::info!(
        "Recorded collision from frame {} into {} trial {number}",
        readings.frame,
        mode.as_str()
    );
    Ok(readings)
}
