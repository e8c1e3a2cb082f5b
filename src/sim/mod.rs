//! Deterministic simulation module
//!
//! All air-table physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected random source only
//! - Exactly two bodies, always A then B
//! - No rendering or persistence dependencies

pub mod boundary;
pub mod clock;
pub mod collision;
pub mod rng;
pub mod state;
pub mod tick;
pub mod trail;

pub use boundary::{WallHits, apply_walls};
pub use clock::FrameClock;
pub use collision::{CollisionResult, Resolution, body_collision, detect, resolve};
pub use rng::{FixedRandom, RandomSource, SeededRandom};
pub use state::{
    Arena, CollisionCapture, CollisionMode, Layout, LaunchConfig, RigidBody, SimPhase,
    SimulationState, Snapshot, VelocitySnapshot,
};
pub use tick::{Command, TickReport, advance, apply_command};
