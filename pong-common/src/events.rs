//! Event types for the sensor pong system
//!
//! Provides the shared event definitions and the EventBus that fans them out
//! to every interested consumer.
//!
//! # Architecture
//!
//! The system uses hybrid communication:
//! - **EventBus** (tokio::broadcast): one-to-many event broadcasting
//! - **Shared state** (`ScoreBoard` behind its own lock): read-heavy access
//!
//! Events are broadcast via EventBus and can be serialized for transmission
//! to a display or persistence consumer.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Which stage of the combo a scoring hit completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboStage {
    /// First hit on a fresh cup (+1)
    First,
    /// Second hit inside the first combo window (+3)
    Second,
    /// Third hit inside the second combo window (+5); starts the cooldown
    Third,
}

/// Final result of a play session, consumed by the persistence layer
///
/// The engine does not store this anywhere itself; it is emitted once at
/// session end for whoever keeps the high-score table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique id for this play session
    pub session_id: Uuid,
    /// Player name as entered at session start
    pub player: String,
    /// Final aggregate score
    pub score: u64,
    /// When the session ended
    pub ended_at: chrono::DateTime<chrono::Utc>,
}

/// Game event types
///
/// Events are broadcast via EventBus and can be serialized for SSE-style
/// transmission to a display process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A hit scored points on a cup
    ///
    /// Triggers:
    /// - Display: flash the cup, update the score readout
    CupHit {
        /// Cup index (0-based)
        cup: usize,
        /// Combo stage the hit completed
        stage: ComboStage,
        /// Points awarded for this hit
        points: u32,
        /// Aggregate score after the award
        score: u64,
        /// When the hit was processed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A hit landed on a cup that is still locked out after a triple
    ///
    /// Triggers:
    /// - Display: optional "locked" feedback on the cup
    HitIgnored {
        /// Cup index (0-based)
        cup: usize,
        /// When the hit was rejected
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A sensor channel finished calibrating its baseline
    CalibrationCompleted {
        /// Channel index (0-based)
        channel: usize,
        /// Calibrated reference distance in centimeters
        baseline_cm: f64,
        /// When calibration finished
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// All polling loops are up
    MonitoringStarted {
        /// Number of channels being monitored
        channels: usize,
        /// When monitoring started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// All polling loops have been joined and hardware released
    MonitoringStopped {
        /// When monitoring stopped
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The play session ended
    ///
    /// Triggers:
    /// - Persistence: record the summary in the high-score table
    /// - Display: show the game-over screen
    SessionEnded {
        /// Final session record
        summary: SessionSummary,
        /// When the session ended
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl GameEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            GameEvent::CupHit { .. } => "CupHit",
            GameEvent::HitIgnored { .. } => "HitIgnored",
            GameEvent::CalibrationCompleted { .. } => "CalibrationCompleted",
            GameEvent::MonitoringStarted { .. } => "MonitoringStarted",
            GameEvent::MonitoringStopped { .. } => "MonitoringStopped",
            GameEvent::SessionEnded { .. } => "SessionEnded",
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
///
/// `broadcast::Sender::send` is synchronous, so events can be emitted from
/// the std polling threads as well as from async tasks.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GameEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: GameEvent,
    ) -> Result<usize, broadcast::error::SendError<GameEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Used on the hot dispatch path where a missing display is acceptable.
    pub fn emit_lossy(&self, event: GameEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
