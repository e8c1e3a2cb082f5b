//! Simulation state and core data types
//!
//! Everything the renderer reads and the store mirrors lives here. The state
//! is a plain value; `tick::advance` is the only thing that moves it forward.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::launch_direction;
use crate::momentum::kinetic_energy;
use crate::units::grams_to_kg;

/// Collision geometry for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum CollisionMode {
    /// Head-on, momentum along x only
    #[default]
    #[serde(rename = "1D")]
    OneD,
    /// Glancing, momentum has x and y components
    #[serde(rename = "2D")]
    TwoD,
}

impl CollisionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionMode::OneD => "1D",
            CollisionMode::TwoD => "2D",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "1D" | "1-D" => Some(CollisionMode::OneD),
            "2D" | "2-D" => Some(CollisionMode::TwoD),
            _ => None,
        }
    }
}

/// Simulation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimPhase {
    /// Bodies placed, waiting for start
    #[default]
    Idle,
    /// Moving, no collision yet
    Running,
    /// Moving, first collision captured
    Collided,
    /// Stopped by the user; only Reset leaves this phase
    Stopped,
    /// Energy bled off after the collision; terminal until Reset
    Settled,
}

/// A circular puck on the air table (canvas pixels, mass in grams)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub pos: DVec2,
    /// Pixels per tick
    pub vel: DVec2,
    pub mass: f64,
    pub radius: f64,
}

impl RigidBody {
    pub fn new(pos: DVec2, mass: f64, radius: f64) -> Self {
        debug_assert!(mass > 0.0 && radius > 0.0);
        Self {
            pos,
            vel: DVec2::ZERO,
            mass,
            radius,
        }
    }

    pub fn velocity_snapshot(&self) -> VelocitySnapshot {
        VelocitySnapshot {
            vx: self.vel.x,
            vy: self.vel.y,
            mass: self.mass,
        }
    }

    /// Mass in kg paired with velocity, for energy/momentum sums
    fn kg_and_velocity(&self) -> (f64, DVec2) {
        (grams_to_kg(self.mass), self.vel)
    }
}

/// Velocity of one body at a specific instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocitySnapshot {
    pub vx: f64,
    pub vy: f64,
    pub mass: f64,
}

impl VelocitySnapshot {
    pub fn velocity(&self) -> DVec2 {
        DVec2::new(self.vx, self.vy)
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Spark-timer mark of both puck positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub body_a: DVec2,
    pub body_b: DVec2,
    pub frame: u64,
}

/// Before/after velocities of the first collision in a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionCapture {
    pub frame: u64,
    pub mode: CollisionMode,
    /// Pre-resolution velocities, body A then B
    pub before: [VelocitySnapshot; 2],
    /// Post-resolution velocities, body A then B
    pub after: [VelocitySnapshot; 2],
    /// Set once the data has been written into a trial
    #[serde(default)]
    pub committed: bool,
}

/// Canvas extent in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

/// Where the pucks start and how heavy they are
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub arena: Arena,
    /// Start position of the launched puck (A)
    pub start_a: DVec2,
    /// Distance from A to B along the launch line
    pub separation: f64,
    /// Perpendicular offset of B from the launch line in 2-D runs
    pub impact_offset: f64,
    pub radius: f64,
    pub mass_a: f64,
    pub mass_b: f64,
    /// Launch speed varies by ± this fraction per run
    pub speed_noise: f64,
    /// Each puck's mass varies by ± this fraction per run
    pub mass_noise: f64,
}

/// User-selected launch parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfig {
    pub mode: CollisionMode,
    /// Degrees above horizontal (always 0 in 1-D)
    pub angle_deg: f64,
    /// Pixels per tick
    pub speed: f64,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            mode: CollisionMode::OneD,
            angle_deg: 0.0,
            speed: 4.0,
        }
    }
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub body_a: RigidBody,
    pub body_b: RigidBody,
    pub layout: Layout,
    pub launch: LaunchConfig,
    pub phase: SimPhase,
    pub frame_counter: u64,
    /// Spark snapshots, oldest first, at most `MAX_TRAIL_LEN`
    pub trail: Vec<Snapshot>,
    /// First collision of the run, written once
    pub capture: Option<CollisionCapture>,
}

impl SimulationState {
    pub fn new(layout: Layout, launch: LaunchConfig) -> Self {
        let mut state = Self {
            body_a: RigidBody::new(layout.start_a, layout.mass_a, layout.radius),
            body_b: RigidBody::new(layout.start_a, layout.mass_b, layout.radius),
            layout,
            launch,
            phase: SimPhase::Idle,
            frame_counter: 0,
            trail: Vec::with_capacity(MAX_TRAIL_LEN),
            capture: None,
        };
        state.place_bodies();
        state
    }

    /// Put both pucks at rest in their start positions for the current launch
    pub fn place_bodies(&mut self) {
        let layout = &self.layout;
        let dir = launch_direction(self.launch.angle_deg);
        // Perpendicular pointing to the right of travel in canvas space
        let perp = DVec2::new(-dir.y, dir.x);
        let offset = match self.launch.mode {
            CollisionMode::OneD => 0.0,
            CollisionMode::TwoD => layout.impact_offset,
        };

        self.body_a = RigidBody::new(layout.start_a, layout.mass_a, layout.radius);
        self.body_b = RigidBody::new(
            layout.start_a + dir * layout.separation + perp * offset,
            layout.mass_b,
            layout.radius,
        );
    }

    /// Back to Idle with fresh bodies, no trail, no capture
    pub fn reset(&mut self) {
        self.phase = SimPhase::Idle;
        self.frame_counter = 0;
        self.trail.clear();
        self.capture = None;
        self.place_bodies();
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, SimPhase::Running | SimPhase::Collided)
    }

    pub fn has_collided(&self) -> bool {
        self.capture.is_some()
    }

    pub fn before_collision(&self) -> Option<&[VelocitySnapshot; 2]> {
        self.capture.as_ref().map(|c| &c.before)
    }

    pub fn after_collision(&self) -> Option<&[VelocitySnapshot; 2]> {
        self.capture.as_ref().map(|c| &c.after)
    }

    pub fn collision_type(&self) -> CollisionMode {
        self.launch.mode
    }

    pub fn launch_angle(&self) -> f64 {
        self.launch.angle_deg
    }

    pub fn launch_speed(&self) -> f64 {
        self.launch.speed
    }

    /// Captured collision that has not yet been written into a trial
    pub fn pending_capture(&self) -> Option<&CollisionCapture> {
        self.capture.as_ref().filter(|c| !c.committed)
    }

    /// Total kinetic energy (kg·px²/tick²)
    pub fn kinetic_energy(&self) -> f64 {
        kinetic_energy(&[self.body_a.kg_and_velocity(), self.body_b.kg_and_velocity()])
    }

    /// Record the first collision and move Running -> Collided.
    ///
    /// Later collisions in the same run are ignored; returns whether the
    /// capture was taken.
    pub fn record_first_collision(
        &mut self,
        before: [VelocitySnapshot; 2],
        after: [VelocitySnapshot; 2],
    ) -> bool {
        if self.phase != SimPhase::Running || self.capture.is_some() {
            return false;
        }
        self.capture = Some(CollisionCapture {
            frame: self.frame_counter,
            mode: self.launch.mode,
            before,
            after,
            committed: false,
        });
        self.phase = SimPhase::Collided;
        true
    }

    /// Zero both velocities and stop for good (until Reset)
    pub fn settle(&mut self) {
        self.body_a.vel = DVec2::ZERO;
        self.body_b.vel = DVec2::ZERO;
        self.phase = SimPhase::Settled;
    }
}
