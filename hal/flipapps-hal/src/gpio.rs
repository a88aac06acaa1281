//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins. Unlike
//! microcontroller registers, a Linux GPIO line can fail at any access,
//! so every operation reports a [`PinError`].

use core::fmt;

/// GPIO access failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// Reading the line value failed
    Read,
    /// Writing the line value failed
    Write,
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinError::Read => f.write_str("failed to read GPIO line"),
            PinError::Write => f.write_str("failed to write GPIO line"),
        }
    }
}

impl core::error::Error for PinError {}

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high (logic 1)
    fn set_high(&mut self) -> Result<(), PinError>;

    /// Drive the pin low (logic 0)
    fn set_low(&mut self) -> Result<(), PinError>;

    /// Drive the pin to a specific state
    fn set_state(&mut self, high: bool) -> Result<(), PinError> {
        if high {
            self.set_high()
        } else {
            self.set_low()
        }
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> Result<bool, PinError>;

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> Result<bool, PinError> {
        self.is_high().map(|high| !high)
    }
}
