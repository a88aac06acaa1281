//! Board-agnostic core logic for the flip-dot sign controller
//!
//! This crate contains all logic that does not depend on a runtime,
//! the network or specific GPIO hardware:
//!
//! - Button debouncing and the button manager's state vocabulary
//! - Bitmaps, signs and the validated sign roster
//! - Round planning (fanning a bitmap sequence across N signs)
//! - Queued message requests and their validation
//! - Timing configuration with defaults

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod button;
pub mod config;
pub mod display;
pub mod message;

pub use button::{ButtonPress, ButtonState, DebounceState, Debouncer, StateCodeError};
pub use display::{Bitmap, BitmapError, RosterError, Rounds, Sign, SignRoster};
pub use message::{MessageError, MessageRequest, Payload};
