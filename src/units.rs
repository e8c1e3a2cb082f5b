//! Pixel-space to physical unit conversion
//!
//! The simulation runs in canvas pixels and ticks; the lab sheet works in
//! centimetres, seconds and kilograms. Every conversion goes through here.

use crate::consts::{FRAME_RATE_HZ, PIXELS_PER_CM};

/// Canvas distance to centimetres
#[inline]
pub fn pixels_to_cm(px: f64) -> f64 {
    px / PIXELS_PER_CM
}

/// Speed in pixels per tick to centimetres per second
#[inline]
pub fn speed_px_per_frame_to_cm_per_sec(v: f64) -> f64 {
    v * FRAME_RATE_HZ / PIXELS_PER_CM
}

/// Grams to kilograms
#[inline]
pub fn grams_to_kg(mass_grams: f64) -> f64 {
    mass_grams / 1000.0
}

/// Momentum magnitude in kg·cm/s for a body moving at (vx, vy) px/frame
pub fn momentum(mass_grams: f64, vx: f64, vy: f64) -> f64 {
    grams_to_kg(mass_grams) * speed_px_per_frame_to_cm_per_sec(vx.hypot(vy))
}

/// Signed x momentum in kg·cm/s.
///
/// Each axis is converted on its own (not from the magnitude) so x and y
/// totals can be summed independently across bodies.
pub fn momentum_x(mass_grams: f64, vx: f64) -> f64 {
    grams_to_kg(mass_grams) * speed_px_per_frame_to_cm_per_sec(vx)
}

/// Signed y momentum in kg·cm/s
pub fn momentum_y(mass_grams: f64, vy: f64) -> f64 {
    grams_to_kg(mass_grams) * speed_px_per_frame_to_cm_per_sec(vy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_to_cm() {
        assert!((pixels_to_cm(25.0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_speed_conversion() {
        // 4 px/frame * 60 frames/s = 240 px/s = 24 cm/s
        assert!((speed_px_per_frame_to_cm_per_sec(4.0) - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_momentum_along_x() {
        // 505 g puck at 4 px/frame
        let p = momentum(505.0, 4.0, 0.0);
        assert!((p - 12.12).abs() < 1e-9, "got {p}");
    }

    #[test]
    fn test_momentum_uses_magnitude() {
        let p = momentum(1000.0, 3.0, 4.0);
        assert!((p - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_component_momenta_keep_sign() {
        assert!(momentum_x(500.0, -2.0) < 0.0);
        assert!((momentum_y(500.0, 2.0) - 6.0).abs() < 1e-12);
    }
}
