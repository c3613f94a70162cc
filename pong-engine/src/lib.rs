//! # Sensor Pong Engine (pong-engine)
//!
//! Concurrent sensor ingestion and the shared scoring state machine.
//!
//! **Architecture:** one polling thread per ultrasonic channel, all
//! dispatching through a single internally-synchronized [`ScoreBoard`];
//! events fan out to display and persistence consumers over the
//! `pong-common` EventBus.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod hal;
pub mod scoring;
pub mod sensing;

pub use config::Config;
pub use dispatch::{Dispatcher, HitSink};
pub use error::{Error, Result};
pub use scoring::{ComboRules, CupPhase, HitOutcome, ScoreBoard};
pub use sensing::SensorArray;
