//! Button manager states

use core::fmt;

/// Button manager state
///
/// Transitions between `Active` and `Inactive` are freely reversible;
/// `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// LED flashing, trigger pin sampled, presses delivered
    Active,
    /// LED dark, trigger pin ignored
    Inactive,
    /// Manager shut down; the press channel is closed
    Stopped,
}

impl ButtonState {
    /// Whether this state ends the manager
    pub fn is_terminal(&self) -> bool {
        matches!(self, ButtonState::Stopped)
    }

    /// Wire/diagnostic code for this state
    pub fn code(&self) -> u8 {
        match self {
            ButtonState::Active => 0,
            ButtonState::Inactive => 1,
            ButtonState::Stopped => 2,
        }
    }
}

/// Raw state code did not name a known state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCodeError(pub u8);

impl fmt::Display for StateCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown button state code {}", self.0)
    }
}

impl core::error::Error for StateCodeError {}

impl TryFrom<u8> for ButtonState {
    type Error = StateCodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ButtonState::Active),
            1 => Ok(ButtonState::Inactive),
            2 => Ok(ButtonState::Stopped),
            other => Err(StateCodeError(other)),
        }
    }
}

/// One debounced press of the trigger button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPress;
