//! Push-button input handling
//!
//! The button manager samples a trigger pin and flashes an LED while it is
//! armed. This module holds the runtime-independent pieces: the debouncer
//! and the states the manager moves between.

mod debouncer;
mod state;

pub use debouncer::{DebounceState, Debouncer};
pub use state::{ButtonPress, ButtonState, StateCodeError};
