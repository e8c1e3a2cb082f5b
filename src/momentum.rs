//! Momentum bookkeeping for the conservation check
//!
//! Totals, percent differences and the "solve for the unknown final velocity"
//! step students do by hand. Units are whatever the caller passes in.

use glam::DVec2;

/// Momentum vector of a single body
#[inline]
fn momentum_vector(mass: f64, velocity: DVec2) -> DVec2 {
    velocity * mass
}

/// Total momentum of a set of (mass, velocity) pairs
pub fn total_momentum(bodies: &[(f64, DVec2)]) -> DVec2 {
    bodies
        .iter()
        .fold(DVec2::ZERO, |acc, &(m, v)| acc + momentum_vector(m, v))
}

/// Change in momentum of a body between two velocities
#[inline]
pub fn momentum_change(mass: f64, v_initial: f64, v_final: f64) -> f64 {
    mass * (v_final - v_initial)
}

/// Final velocity of body 2 that keeps 1-D momentum conserved.
///
/// Solves `m1*v1i + m2*v2i = m1*v1f + m2*v2f` for `v2f`.
/// Returns `None` for a non-positive `m2`.
pub fn solve_final_velocity(m1: f64, v1i: f64, v1f: f64, m2: f64, v2i: f64) -> Option<f64> {
    if m2 <= 0.0 {
        return None;
    }
    Some((m1 * v1i + m2 * v2i - m1 * v1f) / m2)
}

/// Percent difference between before and after totals:
/// `|before - after| / ((before + after) / 2) * 100`.
///
/// `None` when the mean is zero.
pub fn percent_difference(before: f64, after: f64) -> Option<f64> {
    let mean = (before + after) / 2.0;
    if mean == 0.0 {
        return None;
    }
    Some(((before - after).abs() / mean * 100.0).abs())
}

/// Arithmetic mean, `None` for an empty set
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Total kinetic energy of a set of (mass, velocity) pairs
pub fn kinetic_energy(bodies: &[(f64, DVec2)]) -> f64 {
    bodies
        .iter()
        .map(|&(m, v)| 0.5 * m * v.length_squared())
        .sum()
}
