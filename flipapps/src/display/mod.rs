//! Sign driver client
//!
//! The signs are driven by a separate driver process reached over the
//! network. [`SignTransport`] is the raw per-sign call surface;
//! [`Flipdot`] layers the frame pacing protocol on top of it and is what
//! the application draws through.

mod flipdot;
mod transport;

use std::time::Duration;

use thiserror::Error;

use flipapps_core::{Bitmap, RosterError};
use flipapps_protocol::ErrorCode;

use crate::link::LinkError;

pub use flipdot::Flipdot;
pub use transport::{SignTransport, TcpSignTransport};

/// Failure of a single call to the sign driver
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("sign driver call exceeded {0:?} deadline")]
    Timeout(Duration),
    #[error("failed to connect to sign driver at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("sign driver closed the connection")]
    Closed,
    #[error("sign driver rejected request ({code}): {detail}")]
    Remote { code: ErrorCode, detail: String },
    #[error("unexpected response from sign driver")]
    UnexpectedResponse,
}

/// Failure of a display-level operation
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid sign roster: {0}")]
    Roster(#[from] RosterError),
    #[error("frame is {actual:?}, signs are {expected:?}")]
    FrameSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Something bitmaps can be drawn to
///
/// Implemented by [`Flipdot`]; the application run loop is written against
/// this trait.
#[allow(async_fn_in_trait)]
pub trait Display {
    /// Show `frames` across the signs; see [`Flipdot::draw`]
    async fn draw(&mut self, frames: Vec<Bitmap>, hold: bool) -> Result<(), DisplayError>;
}
