//! Tunable detection and timing parameters
//!
//! One central place for every knob the sensing side exposes, with the
//! deployed defaults. Values live in the config file; durations are stored
//! as seconds so the TOML stays readable.
//!
//! Note that `debounce_s` (hardware chatter suppression, per channel) and the
//! scoring engine's cooldown window (gameplay lockout, per cup) are separate
//! knobs and must stay separate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable parameters for the sensor array
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Number of baseline samples taken per channel during calibration
    pub calibration_samples: usize,

    /// Delay between successive calibration samples, in seconds
    pub calibration_spacing_s: f64,

    /// Delay between polling iterations on each channel, in seconds
    pub poll_interval_s: f64,

    /// Minimum time between two dispatched events from the same channel,
    /// in seconds
    pub debounce_s: f64,

    /// Fraction of the baseline a reading must deviate by to count as a hit
    pub threshold_fraction: f64,

    /// Upper bound on each echo wait inside a single measurement, in seconds
    pub echo_wait_s: f64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            calibration_samples: 10,
            calibration_spacing_s: 0.1,
            poll_interval_s: 0.1,
            debounce_s: 1.0,
            threshold_fraction: 0.10,
            echo_wait_s: 0.1,
        }
    }
}

impl Tunables {
    /// Delay between calibration samples
    pub fn calibration_spacing(&self) -> Duration {
        Duration::from_secs_f64(self.calibration_spacing_s)
    }

    /// Delay between polling iterations
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_s)
    }

    /// Per-channel debounce window
    pub fn debounce(&self) -> Duration {
        Duration::from_secs_f64(self.debounce_s)
    }

    /// Per-direction echo wait deadline
    pub fn echo_wait(&self) -> Duration {
        Duration::from_secs_f64(self.echo_wait_s)
    }
}
