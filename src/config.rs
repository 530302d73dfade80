//! Session configuration.
//!
//! A [`SessionConfig`] captures everything needed to build a
//! [`Session`](crate::session::Session) and can be stored as JSON. Missing
//! fields take their defaults, so partial files are fine.

use crate::batch::DEFAULT_BATCH_CAPACITY;
use crate::error::ConfigError;
use crate::field::DEFAULT_FIELD_SEED;
use crate::trail::{PointTrailOptions, ShapeTrailOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete session configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Frames of history kept for trails.
    pub history_capacity: usize,
    /// Particles recorded per history frame.
    pub particle_capacity: usize,
    /// Instances per trail batch.
    pub batch_capacity: usize,
    /// Simulation steps per wall-clock second.
    pub steps_per_second: f32,
    /// Strength passed to the program generator.
    pub generator_strength: f32,
    /// Generate a new pattern whenever the field runs empty.
    pub generate_automatically: bool,
    /// Seed for particle seeds.
    pub seed: u64,
    /// Program compiled at startup.
    pub initial_source: String,
    pub points: PointTrailOptions,
    pub shapes: ShapeTrailOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_capacity: 300,
            particle_capacity: 4096,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            steps_per_second: 60.0,
            generator_strength: 1.0,
            generate_automatically: false,
            seed: DEFAULT_FIELD_SEED,
            initial_source: String::new(),
            points: PointTrailOptions::default(),
            shapes: ShapeTrailOptions::default(),
        }
    }
}

impl SessionConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SessionConfig::from_json(
            r#"{ "steps_per_second": 30, "points": { "trail_length": 40, "trail_diffusion_scale": 0.5 } }"#,
        )
        .unwrap();

        assert_eq!(config.steps_per_second, 30.0);
        assert_eq!(config.history_capacity, 300);
        assert_eq!(config.points.trail_length, 40.0);
        assert_eq!(config.points.snapshot_offset, 10);
        assert_eq!(config.shapes, ShapeTrailOptions::default());
    }

    #[test]
    fn test_save_and_load() {
        let mut config = SessionConfig::default();
        config.shapes.trail_attenuation = Curve::Smooth;
        config.initial_source = r#"{ "rate": 3 }"#.into();

        let path = std::env::temp_dir().join(format!("dotrail-config-{}.json", std::process::id()));
        config.save(&path).unwrap();
        let loaded = SessionConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_bad_json_is_reported() {
        let err = SessionConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));

        let err = SessionConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
