//! Raspberry Pi GPIO backend
//!
//! Thin adapter over rppal. Line handles release their pins on drop, which
//! the monitor's shutdown ordering relies on.

use rppal::gpio::{Gpio, InputPin, OutputPin};

use super::{GpioBank, InputLine, OutputLine};
use crate::error::{Error, Result};

/// GPIO controller of the Pi's main header
pub struct RpiBank {
    gpio: Gpio,
}

impl RpiBank {
    pub fn new() -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| Error::Gpio(e.to_string()))?;
        Ok(Self { gpio })
    }
}

impl GpioBank for RpiBank {
    type Output = RpiOutput;
    type Input = RpiInput;

    fn open_output(&self, line: u8) -> Result<RpiOutput> {
        let pin = self
            .gpio
            .get(line)
            .map_err(|e| Error::Gpio(format!("line {line}: {e}")))?;
        Ok(RpiOutput {
            pin: pin.into_output_low(),
        })
    }

    fn open_input(&self, line: u8) -> Result<RpiInput> {
        let pin = self
            .gpio
            .get(line)
            .map_err(|e| Error::Gpio(format!("line {line}: {e}")))?;
        Ok(RpiInput {
            pin: pin.into_input(),
        })
    }
}

pub struct RpiOutput {
    pin: OutputPin,
}

impl OutputLine for RpiOutput {
    fn set(&mut self, high: bool) -> Result<()> {
        if high {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}

pub struct RpiInput {
    pin: InputPin,
}

impl InputLine for RpiInput {
    fn is_high(&mut self) -> Result<bool> {
        Ok(self.pin.is_high())
    }
}
