//! Config-driven line allocation

use embedded_hal::digital::{InputPin as _, OutputPin as _};
use flipapps_hal::{InputPin, OutputPin, PinError};
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::CdevPin;
use log::debug;

/// Error opening a chip or requesting a line
#[derive(Debug, thiserror::Error)]
pub enum LinuxPinError {
    #[error("failed to open GPIO chip {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("failed to request GPIO line {line}: {reason}")]
    Request { line: u32, reason: String },
}

/// An opened GPIO chip that hands out lines by number
pub struct GpioChip {
    chip: Chip,
    path: String,
}

impl GpioChip {
    /// Open a GPIO character device such as `/dev/gpiochip0`
    pub fn open(path: &str) -> Result<Self, LinuxPinError> {
        let chip = Chip::new(path).map_err(|e| LinuxPinError::Open {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Opened GPIO chip {}", path);
        Ok(Self {
            chip,
            path: path.to_string(),
        })
    }

    fn request(
        &mut self,
        line: u32,
        flags: LineRequestFlags,
        initial: u8,
        label: &str,
    ) -> Result<CdevPin, LinuxPinError> {
        let handle = self
            .chip
            .get_line(line)
            .and_then(|l| l.request(flags, initial, label))
            .map_err(|e| LinuxPinError::Request {
                line,
                reason: e.to_string(),
            })?;
        let pin = CdevPin::new(handle).map_err(|e| LinuxPinError::Request {
            line,
            reason: e.to_string(),
        })?;
        debug!("Requested line {} on {} as {}", line, self.path, label);
        Ok(pin)
    }

    /// Request `line` as an input
    pub fn input(&mut self, line: u32, label: &str) -> Result<LineInput, LinuxPinError> {
        self.request(line, LineRequestFlags::INPUT, 0, label)
            .map(|pin| LineInput { pin })
    }

    /// Request `line` as an output, initially low
    pub fn output(&mut self, line: u32, label: &str) -> Result<LineOutput, LinuxPinError> {
        self.request(line, LineRequestFlags::OUTPUT, 0, label)
            .map(|pin| LineOutput { pin })
    }
}

/// A GPIO line requested as input
///
/// Access failures are returned, not logged; the sampler polls every
/// millisecond and reports a dead line once.
pub struct LineInput {
    pin: CdevPin,
}

impl InputPin for LineInput {
    fn is_high(&mut self) -> Result<bool, PinError> {
        self.pin.is_high().map_err(|_| PinError::Read)
    }
}

/// A GPIO line requested as output
pub struct LineOutput {
    pin: CdevPin,
}

impl OutputPin for LineOutput {
    fn set_high(&mut self) -> Result<(), PinError> {
        self.pin.set_high().map_err(|_| PinError::Write)
    }

    fn set_low(&mut self) -> Result<(), PinError> {
        self.pin.set_low().map_err(|_| PinError::Write)
    }
}
