//! Per-cup scoring state machine
//!
//! All mutation of cup state and the aggregate score happens inside one
//! mutex owned by the board, and `register_hit` is the only public mutation
//! path: no caller can reach the state without the lock being held. Hits
//! for the same cup apply in lock acquisition order.
//!
//! A cup walks a three-stage combo: +1 for a first hit, +3 for a second hit
//! inside the first window, +5 for a third inside the second window. The
//! triple locks the cup for the cooldown, after which it starts over.
//! Expired windows read as a fresh cup lazily; no timer writes resets back.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use pong_common::events::ComboStage;

use crate::error::{Error, Result};

/// Points for each combo stage
const FIRST_HIT_POINTS: u32 = 1;
const SECOND_HIT_POINTS: u32 = 3;
const THIRD_HIT_POINTS: u32 = 5;

/// Combo and cooldown windows
///
/// The cooldown is a gameplay lockout per cup; the sensor array's debounce
/// window is hardware chatter suppression per channel. They are separate
/// knobs on purpose.
#[derive(Debug, Clone)]
pub struct ComboRules {
    /// Window after a first hit during which a second hit upgrades the combo
    pub first_hit_window: Duration,
    /// Window after a second hit during which a third hit completes the combo
    pub second_hit_window: Duration,
    /// Lockout after a completed combo
    pub cooldown: Duration,
}

impl Default for ComboRules {
    fn default() -> Self {
        Self {
            first_hit_window: Duration::from_secs(3),
            second_hit_window: Duration::from_secs(2),
            cooldown: Duration::from_secs(1),
        }
    }
}

/// What a registered hit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The hit scored
    Scored {
        stage: ComboStage,
        points: u32,
        /// Aggregate score after the award
        score: u64,
    },
    /// The cup was locked; nothing changed
    Ignored,
}

/// Effective cup phase at a given instant (the lazy-reset view)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CupPhase {
    /// No live combo; the next hit scores +1
    Idle,
    /// One hit landed; a second inside the window scores +3
    Primed,
    /// Two hits landed; a third inside the window scores +5
    Charged,
    /// Triple complete; hits are ignored until the cooldown elapses
    Locked,
}

/// Per-cup record
#[derive(Debug, Clone, Copy, Default)]
struct CupState {
    hits: u8,
    last_hit: Option<Instant>,
    cooldown_since: Option<Instant>,
}

impl CupState {
    /// Phase as of `now`
    ///
    /// All window comparisons are strict on the still-active side: at
    /// exactly `cooldown` (or a combo window) elapsed, the cup is out.
    fn phase(&self, now: Instant, rules: &ComboRules) -> CupPhase {
        if let Some(since) = self.cooldown_since {
            return if now.duration_since(since) < rules.cooldown {
                CupPhase::Locked
            } else {
                // An elapsed cooldown ends the combo outright, even though
                // the last hit may still sit inside the second-hit window.
                CupPhase::Idle
            };
        }
        match (self.hits, self.last_hit) {
            (2, Some(at)) if now.duration_since(at) < rules.second_hit_window => CupPhase::Charged,
            (1, Some(at)) if now.duration_since(at) < rules.first_hit_window => CupPhase::Primed,
            _ => CupPhase::Idle,
        }
    }
}

/// Board snapshot for a display consumer
#[derive(Debug, Clone)]
pub struct BoardView {
    pub score: u64,
    pub cups: Vec<CupView>,
}

/// One cup as a display consumer sees it
#[derive(Debug, Clone, Copy)]
pub struct CupView {
    pub phase: CupPhase,
    /// Effective hit count, always in {0, 1, 2}
    pub hits: u8,
}

struct BoardState {
    cups: Vec<CupState>,
    score: u64,
}

/// The scoring engine
///
/// One mutex covers every cup and the aggregate score, so two hits can
/// never interleave their read-modify-write, whatever thread they arrive
/// on.
pub struct ScoreBoard {
    state: Mutex<BoardState>,
    rules: ComboRules,
    cup_count: usize,
}

impl ScoreBoard {
    /// Board with `cups` targets, all idle, score zero
    pub fn new(cups: usize, rules: ComboRules) -> Self {
        Self {
            state: Mutex::new(BoardState {
                cups: vec![CupState::default(); cups],
                score: 0,
            }),
            rules,
            cup_count: cups,
        }
    }

    /// Number of targets on the board
    pub fn cup_count(&self) -> usize {
        self.cup_count
    }

    /// Apply one timestamped hit to a cup
    ///
    /// Callable concurrently from every polling thread and from synchronous
    /// input. An out-of-range index is rejected without touching any state.
    pub fn register_hit(&self, cup: usize, now: Instant) -> Result<HitOutcome> {
        let mut state = self.state.lock().unwrap();
        let cup_state = state.cups.get_mut(cup).ok_or(Error::InvalidCup {
            index: cup,
            cups: self.cup_count,
        })?;

        let (stage, points) = match cup_state.phase(now, &self.rules) {
            CupPhase::Locked => return Ok(HitOutcome::Ignored),
            CupPhase::Charged => {
                // Hits stay at 2; the cooldown alone ends the combo.
                cup_state.cooldown_since = Some(now);
                cup_state.last_hit = Some(now);
                (ComboStage::Third, THIRD_HIT_POINTS)
            }
            CupPhase::Primed => {
                cup_state.hits = 2;
                cup_state.last_hit = Some(now);
                (ComboStage::Second, SECOND_HIT_POINTS)
            }
            CupPhase::Idle => {
                cup_state.hits = 1;
                cup_state.last_hit = Some(now);
                cup_state.cooldown_since = None;
                (ComboStage::First, FIRST_HIT_POINTS)
            }
        };

        state.score += u64::from(points);
        Ok(HitOutcome::Scored {
            stage,
            points,
            score: state.score,
        })
    }

    /// Current aggregate score
    pub fn score(&self) -> u64 {
        self.state.lock().unwrap().score
    }

    /// Consistent view of the whole board as of `now`
    pub fn snapshot(&self, now: Instant) -> BoardView {
        let state = self.state.lock().unwrap();
        let cups = state
            .cups
            .iter()
            .map(|c| {
                let phase = c.phase(now, &self.rules);
                let hits = match phase {
                    CupPhase::Idle => 0,
                    CupPhase::Primed => 1,
                    CupPhase::Charged | CupPhase::Locked => 2,
                };
                CupView { phase, hits }
            })
            .collect();
        BoardView {
            score: state.score,
            cups,
        }
    }
}
