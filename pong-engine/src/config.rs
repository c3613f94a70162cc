//! Engine configuration
//!
//! A TOML file carrying the sensor pin map and the tunables. The defaults
//! reproduce the deployed ten-sensor wiring, so a bare invocation matches
//! the rack as built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use pong_common::params::Tunables;

use crate::error::{Error, Result};

/// BCM line pair driving one ultrasonic sensor
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorPins {
    pub trigger: u8,
    pub echo: u8,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// One entry per cup, in cup order
    pub sensors: Vec<SensorPins>,

    /// Detection and timing knobs
    pub tunables: Tunables,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Wiring of the ten-cup rack
            sensors: vec![
                SensorPins { trigger: 23, echo: 24 },
                SensorPins { trigger: 17, echo: 27 },
                SensorPins { trigger: 22, echo: 10 },
                SensorPins { trigger: 9, echo: 11 },
                SensorPins { trigger: 5, echo: 6 },
                SensorPins { trigger: 13, echo: 19 },
                SensorPins { trigger: 26, echo: 21 },
                SensorPins { trigger: 20, echo: 16 },
                SensorPins { trigger: 12, echo: 7 },
                SensorPins { trigger: 8, echo: 25 },
            ],
            tunables: Tunables::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Number of cups, one per configured sensor
    pub fn cup_count(&self) -> usize {
        self.sensors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rack_has_ten_cups() {
        let config = Config::default();
        assert_eq!(config.cup_count(), 10);
        assert_eq!(config.sensors[0].trigger, 23);
        assert_eq!(config.sensors[9].echo, 25);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [[sensors]]
            trigger = 2
            echo = 3

            [tunables]
            debounce_s = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.cup_count(), 1);
        assert_eq!(config.sensors[0].echo, 3);
        assert!((config.tunables.debounce_s - 0.5).abs() < f64::EPSILON);
        // Unspecified tunables fall back to defaults
        assert_eq!(config.tunables.calibration_samples, 10);
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::default();
        let raw = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();
        assert_eq!(parsed.cup_count(), config.cup_count());
    }
}
