//! Display-side domain types
//!
//! Bitmaps, the sign roster and the round planner used by the sign
//! driver client.

mod bitmap;
mod rounds;
mod sign;

pub use bitmap::{Bitmap, BitmapError};
pub use rounds::Rounds;
pub use sign::{RosterError, Sign, SignRoster};
