//! Dispatch bridge between event sources and the scoring engine
//!
//! Every hit, whatever produced it (a polling thread or a synchronous key
//! press), goes through one [`Dispatcher`]. The board's own lock does the
//! serialization; the bridge adds the timestamp, the event emission, and
//! error reporting, so the polling loops stay free of scoring knowledge.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use pong_common::events::{EventBus, GameEvent};

use crate::error::Result;
use crate::scoring::{HitOutcome, ScoreBoard};

/// Where detected hits are delivered
///
/// Safe to call concurrently from any polling loop. Errors are returned to
/// the caller, which logs them and carries on with its next iteration.
pub trait HitSink: Send + Sync {
    fn on_hit(&self, target: usize) -> Result<()>;
}

/// The one synchronized hand-off into the scoring engine
pub struct Dispatcher {
    board: Arc<ScoreBoard>,
    events: EventBus,
}

impl Dispatcher {
    pub fn new(board: Arc<ScoreBoard>, events: EventBus) -> Self {
        Self { board, events }
    }

    /// The board this dispatcher feeds
    pub fn board(&self) -> &Arc<ScoreBoard> {
        &self.board
    }
}

impl HitSink for Dispatcher {
    fn on_hit(&self, target: usize) -> Result<()> {
        let now = Instant::now();
        match self.board.register_hit(target, now)? {
            HitOutcome::Scored { stage, points, score } => {
                debug!("Cup {target} scored +{points} ({stage:?}), total {score}");
                self.events.emit_lossy(GameEvent::CupHit {
                    cup: target,
                    stage,
                    points,
                    score,
                    timestamp: chrono::Utc::now(),
                });
            }
            HitOutcome::Ignored => {
                debug!("Cup {target} is locked, hit ignored");
                self.events.emit_lossy(GameEvent::HitIgnored {
                    cup: target,
                    timestamp: chrono::Utc::now(),
                });
            }
        }
        Ok(())
    }
}
