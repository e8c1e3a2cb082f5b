//! Collision detection and response between the two pucks
//!
//! Circle-circle overlap test, then an impulse along the centre line with a
//! randomized coefficient of restitution. Momentum is conserved exactly for
//! any restitution; only kinetic energy depends on it.

use glam::DVec2;

use super::rng::RandomSource;
use super::state::RigidBody;
use crate::consts::{RESTITUTION_BASE, RESTITUTION_SPREAD};
use crate::momentum::total_momentum;

/// Result of an overlap check
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Whether the circles touch or overlap
    pub hit: bool,
    /// Unit normal from A's centre toward B's (zero if centres coincide)
    pub normal: DVec2,
    /// Overlap depth (for position correction)
    pub penetration: f64,
    /// Centre-to-centre distance
    pub distance: f64,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: DVec2::ZERO,
            penetration: 0.0,
            distance: 0.0,
        }
    }
}

/// Outcome of a resolved collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub restitution: f64,
    /// Signed impulse scale `j`; negative when the bodies were approaching
    pub impulse: f64,
}

/// True iff the centres are no further apart than the sum of the radii
#[inline]
pub fn detect(a: &RigidBody, b: &RigidBody) -> bool {
    a.pos.distance(b.pos) <= a.radius + b.radius
}

/// Full overlap check with normal and penetration depth
pub fn body_collision(a: &RigidBody, b: &RigidBody) -> CollisionResult {
    let delta = b.pos - a.pos;
    let distance = delta.length();
    let reach = a.radius + b.radius;

    if distance > reach {
        return CollisionResult::miss();
    }

    let normal = if distance > 0.0 {
        delta / distance
    } else {
        DVec2::ZERO
    };

    CollisionResult {
        hit: true,
        normal,
        penetration: reach - distance,
        distance,
    }
}

/// Draw a coefficient of restitution: base ± spread, uniform
pub fn draw_restitution<R: RandomSource + ?Sized>(rng: &mut R) -> f64 {
    RESTITUTION_BASE + rng.jitter(RESTITUTION_SPREAD)
}

/// Resolve a puck-puck contact using a restitution drawn from `rng`.
///
/// Returns `None` (and leaves both bodies untouched) unless the pucks touch
/// and are approaching along a defined normal. The random draw only happens
/// once that holds.
pub fn resolve<R: RandomSource + ?Sized>(
    a: &mut RigidBody,
    b: &mut RigidBody,
    rng: &mut R,
) -> Option<Resolution> {
    let contact = approaching_contact(a, b)?;
    let restitution = draw_restitution(rng);
    Some(apply_contact(a, b, contact, restitution))
}

/// Resolve with an explicit restitution coefficient
pub fn resolve_with_restitution(
    a: &mut RigidBody,
    b: &mut RigidBody,
    restitution: f64,
) -> Option<Resolution> {
    let contact = approaching_contact(a, b)?;
    Some(apply_contact(a, b, contact, restitution))
}

struct Contact {
    normal: DVec2,
    penetration: f64,
    /// Relative normal velocity of B with respect to A
    dvn: f64,
}

fn approaching_contact(a: &RigidBody, b: &RigidBody) -> Option<Contact> {
    let overlap = body_collision(a, b);
    // Coincident centres have no usable normal
    if !overlap.hit || overlap.distance == 0.0 {
        return None;
    }
    let dvn = (b.vel - a.vel).dot(overlap.normal);
    if dvn > 0.0 {
        return None;
    }
    Some(Contact {
        normal: overlap.normal,
        penetration: overlap.penetration,
        dvn,
    })
}

fn system_momentum(a: &RigidBody, b: &RigidBody) -> DVec2 {
    total_momentum(&[(a.mass, a.vel), (b.mass, b.vel)])
}

fn apply_contact(a: &mut RigidBody, b: &mut RigidBody, contact: Contact, e: f64) -> Resolution {
    let Contact {
        normal,
        penetration,
        dvn,
    } = contact;
    let momentum_before = system_momentum(a, b);

    // j scaled by the other body's mass: m_a*Δv_a + m_b*Δv_b = 0
    let j = (1.0 + e) * dvn / (a.mass + b.mass);
    a.vel += normal * (j * b.mass);
    b.vel -= normal * (j * a.mass);

    // Push apart by half the overlap each
    if penetration > 0.0 {
        let half = normal * (penetration / 2.0);
        a.pos -= half;
        b.pos += half;
    }

    let drift = (system_momentum(a, b) - momentum_before).length();
    debug_assert!(drift <= 1e-9 * momentum_before.length().max(1.0));
    log::debug!(
        "puck collision resolved: e={e:.3}, j={j:.5}, penetration={penetration:.3}, \
         momentum drift={drift:.2e}"
    );

    Resolution {
        restitution: e,
        impulse: j,
    }
}
