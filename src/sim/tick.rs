//! Fixed timestep simulation tick
//!
//! Core loop that advances the air table deterministically, plus the
//! command surface that moves the run through its lifecycle.

use super::boundary::apply_walls;
use super::collision::{detect, resolve};
use super::rng::RandomSource;
use super::state::{CollisionMode, SimPhase, SimulationState};
use super::trail;
use crate::consts::*;
use crate::launch_direction;

/// Commands from the lab controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Reset,
    SetMode(CollisionMode),
    /// Degrees above horizontal, clamped to 1..=15 (ignored in 1-D)
    SetLaunchAngle(f64),
    /// Pixels per tick, clamped to 2..=6
    SetLaunchSpeed(f64),
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The pucks were in contact this tick
    pub contact: bool,
    /// This tick captured the run's first collision
    pub first_collision: bool,
    /// Either puck bounced off a wall
    pub wall_bounce: bool,
    /// A spark snapshot was recorded
    pub sampled: bool,
    /// The run settled this tick
    pub settled: bool,
}

/// Advance the simulation by one fixed timestep.
///
/// Does nothing unless the run is Running or Collided.
pub fn advance<R: RandomSource + ?Sized>(state: &mut SimulationState, rng: &mut R) -> TickReport {
    let mut report = TickReport::default();
    if !state.is_running() {
        return report;
    }

    state.frame_counter += 1;

    state.body_a.pos += state.body_a.vel;
    state.body_b.pos += state.body_b.vel;

    let arena = state.layout.arena;
    let hits_a = apply_walls(&mut state.body_a, &arena);
    let hits_b = apply_walls(&mut state.body_b, &arena);
    report.wall_bounce = hits_a.any() || hits_b.any();

    if detect(&state.body_a, &state.body_b) {
        report.contact = true;
        let before = [
            state.body_a.velocity_snapshot(),
            state.body_b.velocity_snapshot(),
        ];
        if resolve(&mut state.body_a, &mut state.body_b, rng).is_some() {
            let after = [
                state.body_a.velocity_snapshot(),
                state.body_b.velocity_snapshot(),
            ];
            if state.record_first_collision(before, after) {
                report.first_collision = true;
                log::info!(
                    "First collision at frame {} ({} run)",
                    state.frame_counter,
                    state.launch.mode.as_str()
                );
            }
        }
    }

    state.body_a.vel *= FRICTION_DAMPING;
    state.body_b.vel *= FRICTION_DAMPING;

    if state.has_collided() && state.kinetic_energy() < SETTLE_ENERGY {
        state.settle();
        report.settled = true;
        log::info!("Run settled at frame {}", state.frame_counter);
    }

    report.sampled = trail::sample(state);
    report
}

/// Apply a control command. Returns true if the state changed.
pub fn apply_command<R: RandomSource + ?Sized>(
    state: &mut SimulationState,
    command: Command,
    rng: &mut R,
) -> bool {
    match command {
        Command::Start => start(state, rng),
        Command::Stop => {
            if !state.is_running() {
                return false;
            }
            state.phase = SimPhase::Stopped;
            log::info!("Run stopped at frame {}", state.frame_counter);
            true
        }
        Command::Reset => {
            state.reset();
            log::info!("Run reset");
            true
        }
        Command::SetMode(mode) => {
            if state.launch.mode == mode {
                return false;
            }
            state.launch.mode = mode;
            state.launch.angle_deg = match mode {
                CollisionMode::OneD => 0.0,
                CollisionMode::TwoD if state.launch.angle_deg == 0.0 => DEFAULT_2D_ANGLE,
                CollisionMode::TwoD => state.launch.angle_deg,
            };
            relayout_if_idle(state);
            true
        }
        Command::SetLaunchAngle(angle) => {
            if state.launch.mode == CollisionMode::OneD {
                log::debug!("Launch angle ignored in 1D mode");
                return false;
            }
            if !angle.is_finite() {
                return false;
            }
            state.launch.angle_deg = angle.clamp(MIN_LAUNCH_ANGLE, MAX_LAUNCH_ANGLE);
            relayout_if_idle(state);
            true
        }
        Command::SetLaunchSpeed(speed) => {
            if !speed.is_finite() {
                return false;
            }
            state.launch.speed = speed.clamp(MIN_LAUNCH_SPEED, MAX_LAUNCH_SPEED);
            true
        }
    }
}

/// Idle -> Running: lay out the pucks, apply run noise, launch puck A
fn start<R: RandomSource + ?Sized>(state: &mut SimulationState, rng: &mut R) -> bool {
    if state.phase != SimPhase::Idle {
        log::warn!("Start ignored in {:?}; reset first", state.phase);
        return false;
    }

    state.place_bodies();
    let layout = state.layout;
    state.body_a.mass = layout.mass_a * (1.0 + rng.jitter(layout.mass_noise));
    state.body_b.mass = layout.mass_b * (1.0 + rng.jitter(layout.mass_noise));

    let speed = state.launch.speed * (1.0 + rng.jitter(layout.speed_noise));
    state.body_a.vel = launch_direction(state.launch.angle_deg) * speed;

    state.frame_counter = 0;
    state.trail.clear();
    state.capture = None;
    state.phase = SimPhase::Running;
    log::info!(
        "Run started: {} at {:.1} deg, {:.3} px/frame",
        state.launch.mode.as_str(),
        state.launch.angle_deg,
        speed
    );
    true
}

fn relayout_if_idle(state: &mut SimulationState) {
    if state.phase == SimPhase::Idle {
        state.place_bodies();
    }
}
