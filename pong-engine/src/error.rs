//! Error types for pong-engine
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.

use thiserror::Error;

/// Main error type for the pong-engine crate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// GPIO controller or line errors
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// Baseline calibration errors
    #[error("Calibration error: {0}")]
    Calibration(String),

    /// Sensor array lifecycle errors
    #[error("Monitor error: {0}")]
    Monitor(String),

    /// Hit requested on a cup that does not exist
    #[error("Invalid cup index {index}: only {cups} cups configured")]
    InvalidCup { index: usize, cups: usize },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using the pong-engine Error
pub type Result<T> = std::result::Result<T, Error>;
