//! Canvas wall reflection
//!
//! Each axis is handled on its own: a puck poking past a wall has that
//! velocity component inverted and damped, then is clamped back inside.

use super::state::{Arena, RigidBody};
use crate::consts::WALL_DAMPING;

/// Which walls a body touched this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHits {
    pub x: bool,
    pub y: bool,
}

impl WallHits {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Reflect a body off the canvas edges
pub fn apply_walls(body: &mut RigidBody, arena: &Arena) -> WallHits {
    let (x, vx, hit_x) = reflect_axis(body.pos.x, body.vel.x, body.radius, arena.width);
    let (y, vy, hit_y) = reflect_axis(body.pos.y, body.vel.y, body.radius, arena.height);
    body.pos.x = x;
    body.pos.y = y;
    body.vel.x = vx;
    body.vel.y = vy;
    WallHits { x: hit_x, y: hit_y }
}

fn reflect_axis(pos: f64, vel: f64, radius: f64, extent: f64) -> (f64, f64, bool) {
    if pos - radius < 0.0 {
        (radius, -vel * WALL_DAMPING, true)
    } else if pos + radius > extent {
        (extent - radius, -vel * WALL_DAMPING, true)
    } else {
        (pos, vel, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn arena() -> Arena {
        Arena {
            width: 800.0,
            height: 400.0,
        }
    }

    fn body_at(x: f64, y: f64, vx: f64, vy: f64) -> RigidBody {
        let mut body = RigidBody::new(DVec2::new(x, y), 505.0, 20.0);
        body.vel = DVec2::new(vx, vy);
        body
    }

    #[test]
    fn test_right_wall_rebound() {
        let mut body = body_at(785.0, 200.0, 5.0, 1.0);
        let hits = apply_walls(&mut body, &arena());
        assert!(hits.x && !hits.y);
        assert_eq!(body.vel.x, -5.0 * 0.8);
        assert_eq!(body.vel.y, 1.0);
        assert_eq!(body.pos.x, 780.0);
    }

    #[test]
    fn test_top_wall_rebound() {
        let mut body = body_at(300.0, 10.0, 0.0, -3.0);
        apply_walls(&mut body, &arena());
        assert_eq!(body.vel.y, 3.0 * 0.8);
        assert_eq!(body.pos.y, 20.0);
    }

    #[test]
    fn test_corner_hits_both_axes() {
        let mut body = body_at(5.0, 395.0, -2.0, 2.0);
        let hits = apply_walls(&mut body, &arena());
        assert!(hits.x && hits.y);
        assert_eq!(body.vel, DVec2::new(1.6, -1.6));
    }

    #[test]
    fn test_inside_untouched() {
        let mut body = body_at(400.0, 200.0, 3.0, 3.0);
        let hits = apply_walls(&mut body, &arena());
        assert!(!hits.any());
        assert_eq!(body.vel, DVec2::new(3.0, 3.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn wall_rebound_is_exactly_damped(v in 0.01f64..50.0, depth in 0.0f64..10.0) {
                let mut body = body_at(780.0 + depth + 0.001, 200.0, v, 0.0);
                apply_walls(&mut body, &arena());
                prop_assert_eq!(body.vel.x, -v * WALL_DAMPING);
                prop_assert!(body.pos.x + body.radius <= 800.0);
            }
        }
    }
}
