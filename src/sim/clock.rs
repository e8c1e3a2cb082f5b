//! Fixed-step frame clock
//!
//! The host calls in once per animation frame with the real elapsed time;
//! the clock says how many 60 Hz ticks to run so the simulation speed does
//! not depend on the display refresh rate.

use crate::consts::{MAX_FRAME_TIME, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `elapsed` seconds and return the number of ticks due
    pub fn advance_frame(&mut self, elapsed: f64) -> u32 {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return 0;
        }
        self.accumulator += elapsed.min(MAX_FRAME_TIME);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        // Drop backlog we refused to catch up on
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }

    /// Forget any partial tick (on stop/reset)
    pub fn clear(&mut self) {
        self.accumulator = 0.0;
    }
}
