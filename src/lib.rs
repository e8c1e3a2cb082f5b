//! Momentum Lab - two-puck collision simulation for a conservation-of-momentum lab
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, collisions, walls, trail sampling)
//! - `units`: Pixel-space to physical unit conversion
//! - `momentum`: Momentum totals, percent differences, conservation solving
//! - `lab`: Trials, answer validation, section progress, the session command surface
//! - `persistence`: Store collaborator with fire-and-forget saves
//! - `settings`: Data-driven lab configuration

pub mod lab;
pub mod momentum;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod units;

pub use lab::{LabError, LabSession};
pub use settings::LabSettings;

use glam::DVec2;

/// Lab configuration constants
pub mod consts {
    /// Simulation tick rate (one tick per animation frame at 60 Hz)
    pub const FRAME_RATE_HZ: f64 = 60.0;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f64 = 1.0 / FRAME_RATE_HZ;
    /// Maximum ticks per animation frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame gap the clock will catch up on (seconds)
    pub const MAX_FRAME_TIME: f64 = 0.1;

    /// Canvas scale: pixels per centimetre on the air table
    pub const PIXELS_PER_CM: f64 = 10.0;

    /// Spark timer fires every 6th tick (0.1 s at 60 Hz)
    pub const SPARK_INTERVAL_FRAMES: u64 = 6;
    /// Time between spark marks in seconds
    pub const SPARK_INTERVAL_SECS: f64 = SPARK_INTERVAL_FRAMES as f64 / FRAME_RATE_HZ;
    /// Maximum number of spark snapshots kept for rendering
    pub const MAX_TRAIL_LEN: usize = 200;

    /// Mean coefficient of restitution between pucks
    pub const RESTITUTION_BASE: f64 = 0.9;
    /// Restitution varies uniformly by ± this amount per collision
    pub const RESTITUTION_SPREAD: f64 = 0.05;
    /// Velocity kept after bouncing off a canvas wall
    pub const WALL_DAMPING: f64 = 0.8;
    /// Air-table friction applied to every velocity each tick
    pub const FRICTION_DAMPING: f64 = 0.995;
    /// Below this total kinetic energy a collided run settles.
    ///
    /// Measured as `0.5 * kg * (px/frame)^2`: mass is in kilograms, not the
    /// grams stored on the bodies.
    pub const SETTLE_ENERGY: f64 = 0.1;

    /// Launch angle range for 2-D runs (degrees above horizontal)
    pub const MIN_LAUNCH_ANGLE: f64 = 1.0;
    pub const MAX_LAUNCH_ANGLE: f64 = 15.0;
    /// Angle picked when switching to 2-D from a head-on setup
    pub const DEFAULT_2D_ANGLE: f64 = 5.0;
    /// Launch speed range (pixels per frame)
    pub const MIN_LAUNCH_SPEED: f64 = 2.0;
    pub const MAX_LAUNCH_SPEED: f64 = 6.0;

    /// Relative tolerance when grading entered numbers
    pub const RELATIVE_TOLERANCE: f64 = 0.05;
    /// Absolute tolerance floor for near-zero answers
    pub const ABSOLUTE_TOLERANCE: f64 = 0.01;

    /// Trials recorded for each collision type
    pub const TRIALS_PER_MODE: u32 = 3;
}

/// Unit direction vector for an angle measured above the horizontal.
///
/// Canvas y grows downward, so "up" is negative y.
#[inline]
pub fn launch_direction(angle_deg: f64) -> DVec2 {
    let theta = angle_deg.to_radians();
    DVec2::new(theta.cos(), -theta.sin())
}

/// Convert a canvas-space vector (y down) into the lab frame (y up)
#[inline]
pub fn canvas_to_lab(v: DVec2) -> DVec2 {
    DVec2::new(v.x, -v.y)
}

/// Angle of a lab-frame vector from the +x axis, in degrees
#[inline]
pub fn angle_from_horizontal(v: DVec2) -> f64 {
    v.y.atan2(v.x).to_degrees()
}
