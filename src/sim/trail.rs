//! Spark-timer trail sampling
//!
//! A real spark timer marks the table every 0.1 s; we take a snapshot of both
//! puck positions every 6th tick and keep the most recent 200.

use super::state::{SimulationState, Snapshot};
use crate::consts::{MAX_TRAIL_LEN, SPARK_INTERVAL_FRAMES};

/// Whether this frame gets a spark mark
#[inline]
pub fn is_spark_frame(frame: u64) -> bool {
    frame % SPARK_INTERVAL_FRAMES == 0
}

/// Append a snapshot if the current frame is a spark frame.
///
/// Returns true when a sample was taken.
pub fn sample(state: &mut SimulationState) -> bool {
    if !is_spark_frame(state.frame_counter) {
        return false;
    }
    push_bounded(
        &mut state.trail,
        Snapshot {
            body_a: state.body_a.pos,
            body_b: state.body_b.pos,
            frame: state.frame_counter,
        },
    );
    true
}

/// Push a snapshot, dropping the oldest past the cap
pub fn push_bounded(trail: &mut Vec<Snapshot>, snapshot: Snapshot) {
    trail.push(snapshot);
    if trail.len() > MAX_TRAIL_LEN {
        let excess = trail.len() - MAX_TRAIL_LEN;
        trail.drain(..excess);
    }
}
