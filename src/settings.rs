//! Match settings
//!
//! Loaded from a JSON file by the driver; every field has a default so a
//! partial file only overrides what it names.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Configuration for one ring of the sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingSettings {
    /// Display name used in logs and status lines
    pub name: String,
    /// World position of the ring (used by cloud binding)
    pub position: Vec3,
    /// Scale captured at activation; Y is the held axis
    pub initial_extent: Vec3,
    /// Final scale on the shrinking axes (X and Z)
    pub target_extent: f32,
    /// Seconds to go from initial to target extent
    pub shrink_duration: f32,
    /// Delay before this ring starts after the previous one completes.
    /// Falls back to the arena's `inter_ring_delay`. Ignored for the first ring.
    pub delay_before: Option<f32>,
}

impl Default for RingSettings {
    fn default() -> Self {
        Self {
            name: "Ring".to_string(),
            position: Vec3::ZERO,
            initial_extent: Vec3::ONE,
            target_extent: DEFAULT_TARGET_EXTENT,
            shrink_duration: DEFAULT_SHRINK_DURATION,
            delay_before: None,
        }
    }
}

/// Cloud follower tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSettings {
    /// Progress multiplier relative to the ring (1.3 = 30% faster)
    pub speed_multiplier: f32,
    /// Fraction of the initial scale reached at the end
    pub min_scale: f32,
    /// Despawn once the bound ring has finished
    pub despawn_when_ring_done: bool,
    /// Maximum drop searched when binding to a ring below
    pub max_detection_distance: f32,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.3,
            min_scale: 0.05,
            despawn_when_ring_done: true,
            max_detection_distance: 100.0,
        }
    }
}

/// Complete match configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    /// Seconds before the first ring starts shrinking
    pub safe_time: f32,
    /// Total match length in seconds
    pub match_duration: f32,
    /// Default delay between one ring completing and the next starting
    pub inter_ring_delay: f32,
    /// Cosmetic settle window after the match ends
    pub end_grace: f32,
    /// Rings in shrink order
    pub rings: Vec<RingSettings>,
    /// Cloud follower tuning
    pub cloud: CloudSettings,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            safe_time: DEFAULT_SAFE_TIME,
            match_duration: DEFAULT_MATCH_DURATION,
            inter_ring_delay: DEFAULT_INTER_RING_DELAY,
            end_grace: END_GRACE_SECONDS,
            rings: vec![
                RingSettings {
                    name: "Outer Ring".to_string(),
                    initial_extent: Vec3::new(1.0, 0.2, 1.0),
                    target_extent: 0.7,
                    ..Default::default()
                },
                RingSettings {
                    name: "Inner Ring".to_string(),
                    initial_extent: Vec3::new(0.7, 0.2, 0.7),
                    target_extent: 0.4,
                    ..Default::default()
                },
            ],
            cloud: CloudSettings::default(),
        }
    }
}

impl ArenaSettings {
    /// Parse settings from a JSON string and validate them
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file and validate them
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        log::info!("Loaded arena settings from {} ({} rings)", path.display(), settings.rings.len());
        Ok(settings)
    }

    /// Effective delay before ring `index` starts
    pub fn delay_before(&self, index: usize) -> f32 {
        if index == 0 {
            return 0.0;
        }
        self.rings
            .get(index)
            .and_then(|r| r.delay_before)
            .unwrap_or(self.inter_ring_delay)
    }

    /// Reject configurations the sequencer cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rings.len() < MIN_RINGS {
            return Err(ConfigError::TooFewRings {
                found: self.rings.len(),
                required: MIN_RINGS,
            });
        }
        non_negative("safe_time", self.safe_time, SECONDS)?;
        non_negative("inter_ring_delay", self.inter_ring_delay, SECONDS)?;
        non_negative("end_grace", self.end_grace, SECONDS)?;
        if self.match_duration.is_nan() || self.match_duration <= 0.0 {
            return Err(ConfigError::invalid(
                "match_duration",
                self.match_duration,
                "a positive number of seconds",
            ));
        }

        for (i, ring) in self.rings.iter().enumerate() {
            non_negative(&format!("rings[{i}].shrink_duration"), ring.shrink_duration, SECONDS)?;
            if let Some(delay) = ring.delay_before {
                non_negative(&format!("rings[{i}].delay_before"), delay, SECONDS)?;
            }
            if ring.target_extent.is_nan()
                || ring.target_extent <= 0.0
                || ring.target_extent > ring.initial_extent.x
            {
                return Err(ConfigError::invalid(
                    format!("rings[{i}].target_extent"),
                    ring.target_extent,
                    format!("a value in (0, {}]", ring.initial_extent.x),
                ));
            }
        }

        let cloud = &self.cloud;
        if cloud.speed_multiplier.is_nan() || cloud.speed_multiplier <= 0.0 {
            return Err(ConfigError::invalid(
                "cloud.speed_multiplier",
                cloud.speed_multiplier,
                "a positive multiplier",
            ));
        }
        if !(0.0..=1.0).contains(&cloud.min_scale) {
            return Err(ConfigError::invalid("cloud.min_scale", cloud.min_scale, "a value in [0, 1]"));
        }
        non_negative(
            "cloud.max_detection_distance",
            cloud.max_detection_distance,
            "a non-negative distance",
        )?;

        Ok(())
    }
}

const SECONDS: &str = "a non-negative number of seconds";

fn non_negative(field: &str, value: f32, expected: &str) -> Result<(), ConfigError> {
    if value.is_nan() || value < 0.0 {
        Err(ConfigError::invalid(field, value, expected))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_two_ring_layout() {
        let settings = ArenaSettings::default();
        assert_eq!(settings.rings.len(), 2);
        assert_eq!(settings.safe_time, 30.0);
        assert_eq!(settings.match_duration, 80.0);
        assert_eq!(settings.inter_ring_delay, 5.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = ArenaSettings::from_json_str(r#"{ "safe_time": 10.0 }"#).unwrap();
        assert_eq!(settings.safe_time, 10.0);
        assert_eq!(settings.match_duration, 80.0);
        assert_eq!(settings.rings.len(), 2);
    }

    #[test]
    fn ring_fields_parse_with_glam_vectors() {
        let json = r#"{
            "rings": [
                { "name": "A", "initial_extent": [2.0, 0.5, 2.0], "target_extent": 1.0, "shrink_duration": 10.0 },
                { "name": "B", "initial_extent": [1.0, 0.5, 1.0], "target_extent": 0.5, "delay_before": 2.5 }
            ]
        }"#;
        let settings = ArenaSettings::from_json_str(json).unwrap();
        assert_eq!(settings.rings[0].initial_extent, Vec3::new(2.0, 0.5, 2.0));
        assert_eq!(settings.rings[1].shrink_duration, DEFAULT_SHRINK_DURATION);
        assert_eq!(settings.delay_before(0), 0.0);
        assert_eq!(settings.delay_before(1), 2.5);
    }

    #[test]
    fn single_ring_is_rejected() {
        let json = r#"{ "rings": [ { "name": "Only" } ] }"#;
        let err = ArenaSettings::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::TooFewRings { found: 1, required: 2 }));
    }

    #[test]
    fn target_larger_than_initial_is_rejected() {
        let mut settings = ArenaSettings::default();
        settings.rings[1].target_extent = 5.0;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "rings[1].target_extent"));
    }

    #[test]
    fn negative_times_are_rejected() {
        let mut settings = ArenaSettings::default();
        settings.inter_ring_delay = -1.0;
        assert!(settings.validate().is_err());

        let mut settings = ArenaSettings::default();
        settings.match_duration = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn nan_values_are_rejected() {
        let mut settings = ArenaSettings::default();
        settings.match_duration = f32::NAN;
        assert!(settings.validate().is_err());

        let mut settings = ArenaSettings::default();
        settings.rings[0].target_extent = f32::NAN;
        assert!(settings.validate().is_err());

        let mut settings = ArenaSettings::default();
        settings.cloud.speed_multiplier = f32::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn detection_distance_error_describes_a_distance() {
        let mut settings = ArenaSettings::default();
        settings.cloud.max_detection_distance = -5.0;
        let err = settings.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for 'cloud.max_detection_distance': got '-5', expected a non-negative distance"
        );

        let mut settings = ArenaSettings::default();
        settings.safe_time = -1.0;
        assert!(settings.validate().unwrap_err().to_string().ends_with("a non-negative number of seconds"));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = ArenaSettings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = ArenaSettings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
