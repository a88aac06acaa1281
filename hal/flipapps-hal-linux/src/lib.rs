//! Linux GPIO backend
//!
//! Implements the `flipapps-hal` pin traits on top of the GPIO character
//! device (`/dev/gpiochipN`) via `linux-embedded-hal`. Lines are requested
//! by number at runtime so the pin assignment can come from the config
//! file.

#![deny(unsafe_code)]

pub mod pins;

pub use pins::{GpioChip, LineInput, LineOutput, LinuxPinError};
