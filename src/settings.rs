//! Lab settings
//!
//! Canvas geometry, puck properties and run noise. Persisted as JSON next to
//! the lab data; anything missing or nonsensical falls back to defaults.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::persistence::PersistError;
use crate::sim::{Arena, Layout, LaunchConfig};

/// Puck mass pairings offered by the lab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MassPreset {
    #[default]
    Equal,
    HeavyTarget,
    LightTarget,
}

impl MassPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            MassPreset::Equal => "Equal",
            MassPreset::HeavyTarget => "Heavy target",
            MassPreset::LightTarget => "Light target",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "equal" => Some(MassPreset::Equal),
            "heavy" | "heavy target" | "heavy_target" => Some(MassPreset::HeavyTarget),
            "light" | "light target" | "light_target" => Some(MassPreset::LightTarget),
            _ => None,
        }
    }

    /// (launched puck, target puck) masses in grams
    pub fn masses(&self) -> (f64, f64) {
        match self {
            MassPreset::Equal => (505.0, 505.0),
            MassPreset::HeavyTarget => (505.0, 1010.0),
            MassPreset::LightTarget => (505.0, 252.5),
        }
    }
}

/// Lab configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabSettings {
    /// Seed for the run-noise random source
    pub seed: u64,

    // === Canvas ===
    pub canvas_width: f64,
    pub canvas_height: f64,

    // === Pucks ===
    pub puck_radius: f64,
    pub mass_a_grams: f64,
    pub mass_b_grams: f64,

    // === Launch layout ===
    /// Start position of the launched puck
    pub start_x: f64,
    pub start_y: f64,
    /// Distance to the target puck along the launch line
    pub separation: f64,
    /// Sideways offset of the target in 2-D runs (pixels)
    pub impact_offset: f64,
    /// Initial launch speed (pixels per frame)
    pub launch_speed: f64,

    // === Measurement noise ===
    /// Launch speed varies by ± this fraction
    pub speed_noise: f64,
    /// Puck masses vary by ± this fraction
    pub mass_noise: f64,

    // === Grading ===
    /// Most points an instructor can award per section
    pub max_section_points: f64,
}

impl Default for LabSettings {
    fn default() -> Self {
        Self {
            seed: 0x5EED_1AB5,

            canvas_width: 800.0,
            canvas_height: 400.0,

            puck_radius: 20.0,
            mass_a_grams: 505.0,
            mass_b_grams: 505.0,

            start_x: 150.0,
            start_y: 200.0,
            separation: 250.0,
            impact_offset: 20.0,
            launch_speed: 4.0,

            speed_noise: 0.02,
            mass_noise: 0.01,

            max_section_points: 10.0,
        }
    }
}

impl LabSettings {
    /// Create settings from a mass preset
    pub fn from_preset(preset: MassPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    pub fn apply_preset(&mut self, preset: MassPreset) {
        let (a, b) = preset.masses();
        self.mass_a_grams = a;
        self.mass_b_grams = b;
    }

    /// Replace values that would break the simulation with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        let fraction = |v: f64, fallback: f64| {
            if v.is_finite() && (0.0..0.5).contains(&v) {
                v
            } else {
                fallback
            }
        };

        self.canvas_width = positive(self.canvas_width, defaults.canvas_width);
        self.canvas_height = positive(self.canvas_height, defaults.canvas_height);
        self.puck_radius = positive(self.puck_radius, defaults.puck_radius);
        self.mass_a_grams = positive(self.mass_a_grams, defaults.mass_a_grams);
        self.mass_b_grams = positive(self.mass_b_grams, defaults.mass_b_grams);
        self.separation = positive(self.separation, defaults.separation);
        self.launch_speed = positive(self.launch_speed, defaults.launch_speed);
        self.speed_noise = fraction(self.speed_noise, defaults.speed_noise);
        self.mass_noise = fraction(self.mass_noise, defaults.mass_noise);
        self.max_section_points = positive(self.max_section_points, defaults.max_section_points);
        if !self.impact_offset.is_finite() || self.impact_offset < 0.0 {
            self.impact_offset = defaults.impact_offset;
        }

        let r = self.puck_radius;
        let inside = |v: f64, extent: f64| v.is_finite() && v >= r && v <= extent - r;
        if !inside(self.start_x, self.canvas_width) || !inside(self.start_y, self.canvas_height) {
            self.start_x = self.canvas_width * 0.1875;
            self.start_y = self.canvas_height / 2.0;
        }
        self
    }

    /// Simulation layout derived from these settings
    pub fn layout(&self) -> Layout {
        Layout {
            arena: Arena {
                width: self.canvas_width,
                height: self.canvas_height,
            },
            start_a: DVec2::new(self.start_x, self.start_y),
            separation: self.separation,
            impact_offset: self.impact_offset,
            radius: self.puck_radius,
            mass_a: self.mass_a_grams,
            mass_b: self.mass_b_grams,
            speed_noise: self.speed_noise,
            mass_noise: self.mass_noise,
        }
    }

    /// Launch configuration a fresh session starts with
    pub fn launch(&self) -> LaunchConfig {
        LaunchConfig {
            speed: self.launch_speed.clamp(
                crate::consts::MIN_LAUNCH_SPEED,
                crate::consts::MAX_LAUNCH_SPEED,
            ),
            ..LaunchConfig::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring settings in {}: {e}", path.display()),
            },
            Err(e) => log::info!("No settings at {} ({e})", path.display()),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_layout() {
        let layout = LabSettings::default().layout();
        assert_eq!(layout.arena.width, 800.0);
        assert_eq!(layout.start_a, DVec2::new(150.0, 200.0));
        assert_eq!(layout.mass_a, 505.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = LabSettings::from_json(r#"{ "mass_b_grams": 800.0, "seed": 7 }"#).unwrap();
        assert_eq!(settings.mass_b_grams, 800.0);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.puck_radius, 20.0);
    }

    #[test]
    fn test_sanitized_rejects_bad_values() {
        let settings = LabSettings {
            puck_radius: -3.0,
            mass_a_grams: 0.0,
            speed_noise: f64::NAN,
            start_x: 5000.0,
            max_section_points: -1.0,
            ..LabSettings::default()
        }
        .sanitized();
        assert_eq!(settings.puck_radius, 20.0);
        assert_eq!(settings.mass_a_grams, 505.0);
        assert_eq!(settings.speed_noise, 0.02);
        assert_eq!(settings.start_x, 150.0);
        assert_eq!(settings.max_section_points, 10.0);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(LabSettings::from_json("not json").is_err());
    }

    #[test]
    fn test_presets() {
        let settings = LabSettings::from_preset(MassPreset::HeavyTarget);
        assert_eq!(settings.mass_b_grams, 1010.0);
        assert_eq!(MassPreset::from_str("LIGHT"), Some(MassPreset::LightTarget));
        assert_eq!(MassPreset::Equal.as_str(), "Equal");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let settings = LabSettings::load(Path::new("/nonexistent/momentum-lab.json"));
        assert_eq!(settings.seed, LabSettings::default().seed);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("momentum-lab-settings-{}.json", std::process::id()));
        let settings = LabSettings {
            seed: 1234,
            ..LabSettings::from_preset(MassPreset::LightTarget)
        };
        settings.save(&path).unwrap();
        let loaded = LabSettings::load(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.seed, 1234);
        assert_eq!(loaded.mass_b_grams, 252.5);
    }
}
