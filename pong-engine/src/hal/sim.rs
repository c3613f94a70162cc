//! Deterministic in-memory GPIO backend
//!
//! Input lines replay a scripted level sequence; once the script runs out
//! the last level repeats. Output lines record the last driven level.
//! Lines can be marked refused to exercise per-channel bind failures.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{GpioBank, InputLine, OutputLine};
use crate::error::{Error, Result};

/// Simulated GPIO controller
#[derive(Default)]
pub struct SimBank {
    scripts: Mutex<HashMap<u8, Vec<bool>>>,
    refused: Mutex<HashSet<u8>>,
}

impl SimBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the level sequence an input line will replay once opened
    pub fn script_input(&self, line: u8, levels: Vec<bool>) {
        self.scripts.lock().unwrap().insert(line, levels);
    }

    /// Make any attempt to open `line` fail
    pub fn refuse_line(&self, line: u8) {
        self.refused.lock().unwrap().insert(line);
    }

    fn check_refused(&self, line: u8) -> Result<()> {
        if self.refused.lock().unwrap().contains(&line) {
            return Err(Error::Gpio(format!("line {line} is unavailable")));
        }
        Ok(())
    }
}

impl GpioBank for SimBank {
    type Output = SimOutput;
    type Input = SimInput;

    fn open_output(&self, line: u8) -> Result<SimOutput> {
        self.check_refused(line)?;
        Ok(SimOutput { level: false })
    }

    fn open_input(&self, line: u8) -> Result<SimInput> {
        self.check_refused(line)?;
        let mut levels = self
            .scripts
            .lock()
            .unwrap()
            .get(&line)
            .cloned()
            .unwrap_or_default();
        if levels.is_empty() {
            levels.push(false);
        }
        Ok(SimInput { levels, cursor: 0 })
    }
}

/// Simulated output line; remembers the last driven level
pub struct SimOutput {
    level: bool,
}

impl SimOutput {
    pub fn level(&self) -> bool {
        self.level
    }
}

impl OutputLine for SimOutput {
    fn set(&mut self, high: bool) -> Result<()> {
        self.level = high;
        Ok(())
    }
}

/// Simulated input line replaying a scripted level sequence
pub struct SimInput {
    levels: Vec<bool>,
    cursor: usize,
}

impl InputLine for SimInput {
    fn is_high(&mut self) -> Result<bool> {
        let level = self.levels[self.cursor.min(self.levels.len() - 1)];
        if self.cursor < self.levels.len() {
            self.cursor += 1;
        }
        Ok(level)
    }
}
