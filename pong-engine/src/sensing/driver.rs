//! Pulse-echo channel driver
//!
//! Drives one ultrasonic channel: raise the trigger line for a short pulse,
//! time how long the echo line stays high, and convert the round trip into
//! centimeters. Both echo waits are bounded; a missed deadline yields
//! `Measurement::Timeout` instead of a number.

use std::thread;
use std::time::{Duration, Instant};

use super::probe::{DistanceProbe, Measurement};
use crate::error::Result;
use crate::hal::{GpioBank, InputLine, OutputLine};

/// Speed of sound at room temperature, centimeters per second
pub const SPEED_OF_SOUND_CM_S: f64 = 34_300.0;

/// Trigger pulse width
const TRIGGER_PULSE: Duration = Duration::from_micros(10);

/// Convert an echo round trip into a one-way distance in centimeters
pub fn round_trip_to_cm(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * SPEED_OF_SOUND_CM_S / 2.0
}

/// One ultrasonic channel: a trigger output and an echo input
pub struct PulseProbe<B: GpioBank> {
    trigger: B::Output,
    echo: B::Input,
    echo_wait: Duration,
}

impl<B: GpioBank> PulseProbe<B> {
    /// Bind both lines of a channel
    pub fn open(bank: &B, trigger_line: u8, echo_line: u8, echo_wait: Duration) -> Result<Self> {
        let trigger = bank.open_output(trigger_line)?;
        let echo = bank.open_input(echo_line)?;
        Ok(Self {
            trigger,
            echo,
            echo_wait,
        })
    }

    /// Busy-wait until the echo line reads `level` or the deadline passes.
    /// Returns the instant the level was observed.
    fn wait_for_level(&mut self, level: bool, deadline: Instant) -> Result<Option<Instant>> {
        loop {
            if self.echo.is_high()? == level {
                return Ok(Some(Instant::now()));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }
}

impl<B: GpioBank> DistanceProbe for PulseProbe<B> {
    fn measure(&mut self) -> Result<Measurement> {
        self.trigger.set(true)?;
        thread::sleep(TRIGGER_PULSE);
        self.trigger.set(false)?;

        let rise_deadline = Instant::now() + self.echo_wait;
        let Some(rise) = self.wait_for_level(true, rise_deadline)? else {
            return Ok(Measurement::Timeout);
        };

        let fall_deadline = rise + self.echo_wait;
        let Some(fall) = self.wait_for_level(false, fall_deadline)? else {
            return Ok(Measurement::Timeout);
        };

        Ok(Measurement::Reading(round_trip_to_cm(
            fall.duration_since(rise),
        )))
    }
}
