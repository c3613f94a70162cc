//! Sensor ingestion: channel driver, calibration, and the array monitor

pub mod calibrate;
pub mod driver;
pub mod monitor;
pub mod probe;

pub use driver::PulseProbe;
pub use monitor::{setup, SensorArray};
pub use probe::{DistanceProbe, Measurement, ProbeStep, ScriptedProbe};
