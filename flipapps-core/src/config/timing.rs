//! Timing configuration
//!
//! All periods are stored in milliseconds so they read naturally in TOML
//! and convert to [`Duration`] at the point of use.

use core::fmt;
use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timing configuration failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    /// A period that drives a timer is zero
    ZeroPeriod(&'static str),
    /// The debounce threshold is zero
    ZeroThreshold,
    /// The message queue capacity is zero
    ZeroCapacity,
}

impl fmt::Display for TimingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingError::ZeroPeriod(name) => write!(f, "{name} must be greater than zero"),
            TimingError::ZeroThreshold => f.write_str("debounce_threshold must be greater than zero"),
            TimingError::ZeroCapacity => f.write_str("message_capacity must be greater than zero"),
        }
    }
}

impl core::error::Error for TimingError {}

fn nonzero(value: u64, name: &'static str) -> Result<(), TimingError> {
    if value == 0 {
        Err(TimingError::ZeroPeriod(name))
    } else {
        Ok(())
    }
}

/// Push-button timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ButtonTiming {
    /// LED toggle period while armed
    pub flash_period_ms: u64,
    /// Time the trigger must be held to count as a press
    pub debounce_window_ms: u64,
    /// Consecutive positive samples within the window
    pub debounce_threshold: u32,
}

impl Default for ButtonTiming {
    fn default() -> Self {
        Self {
            flash_period_ms: 1000,
            debounce_window_ms: 50,
            debounce_threshold: 50,
        }
    }
}

impl ButtonTiming {
    pub fn flash_period(&self) -> Duration {
        Duration::from_millis(self.flash_period_ms)
    }

    /// Interval between trigger pin samples (window / threshold)
    pub fn sample_period(&self) -> Duration {
        let threshold = self.debounce_threshold.max(1);
        Duration::from_millis(self.debounce_window_ms) / threshold
    }

    pub fn validate(&self) -> Result<(), TimingError> {
        nonzero(self.flash_period_ms, "flash_period_ms")?;
        nonzero(self.debounce_window_ms, "debounce_window_ms")?;
        if self.debounce_threshold == 0 {
            return Err(TimingError::ZeroThreshold);
        }
        // A sub-nanosecond period truncates to zero and cannot drive a timer
        if self.sample_period().is_zero() {
            return Err(TimingError::ZeroPeriod("debounce_window_ms / debounce_threshold"));
        }
        Ok(())
    }
}

/// Sign driver timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayTiming {
    /// Interval between successive rounds of a multi-round draw
    pub frame_period_ms: u64,
    /// Minimum time a held single-round draw stays up
    pub min_hold_ms: u64,
    /// Deadline applied to every call to the sign driver
    pub call_deadline_ms: u64,
}

impl Default for DisplayTiming {
    fn default() -> Self {
        Self {
            frame_period_ms: 5000,
            min_hold_ms: 2000,
            call_deadline_ms: 10_000,
        }
    }
}

impl DisplayTiming {
    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_period_ms)
    }

    pub fn min_hold(&self) -> Duration {
        Duration::from_millis(self.min_hold_ms)
    }

    pub fn call_deadline(&self) -> Duration {
        Duration::from_millis(self.call_deadline_ms)
    }

    pub fn validate(&self) -> Result<(), TimingError> {
        nonzero(self.frame_period_ms, "frame_period_ms")?;
        nonzero(self.call_deadline_ms, "call_deadline_ms")
    }
}

/// Application run loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AppTiming {
    /// Bounded capacity of the inbound message queue
    pub message_capacity: usize,
    /// Clock repaint period
    pub tick_period_ms: u64,
}

impl Default for AppTiming {
    fn default() -> Self {
        Self {
            message_capacity: 20,
            tick_period_ms: 30_000,
        }
    }
}

impl AppTiming {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn validate(&self) -> Result<(), TimingError> {
        if self.message_capacity == 0 {
            return Err(TimingError::ZeroCapacity);
        }
        nonzero(self.tick_period_ms, "tick_period_ms")
    }
}
