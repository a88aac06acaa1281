//! Flip-dot display driver
//!
//! Fans a bitmap sequence across every sign in the roster, one bitmap per
//! sign per round:
//!
//! - Round one is sent immediately.
//! - Later rounds follow at the frame period.
//! - The final round blanks any sign with nothing left to show.
//!
//! A failed call aborts the draw; nothing is retried.

use std::future::Future;
use std::time::Duration;

use log::{debug, info, trace};
use tokio::time::{self, MissedTickBehavior};

use flipapps_core::config::DisplayTiming;
use flipapps_core::{Bitmap, Rounds, Sign, SignRoster};

use super::{Display, DisplayError, SignTransport, TransportError};

/// Run a transport call under the per-call deadline
async fn with_deadline<T>(
    deadline: Duration,
    call: impl Future<Output = Result<T, TransportError>>,
) -> Result<T, TransportError> {
    time::timeout(deadline, call)
        .await
        .map_err(|_| TransportError::Timeout(deadline))?
}

/// Paced multi-sign display driver
pub struct Flipdot<T> {
    transport: T,
    roster: SignRoster,
    timing: DisplayTiming,
}

impl<T: SignTransport> Flipdot<T> {
    /// Fetch and validate the sign roster
    ///
    /// Fails if the driver reports no signs or signs of differing sizes.
    pub async fn connect(mut transport: T, timing: DisplayTiming) -> Result<Self, DisplayError> {
        let infos = with_deadline(timing.call_deadline(), transport.get_info()).await?;
        let roster = SignRoster::from_infos(&infos)?;
        let (width, height) = roster.size();
        info!("Driving {} sign(s) of {}x{}", roster.len(), width, height);

        Ok(Self {
            transport,
            roster,
            timing,
        })
    }

    pub fn roster(&self) -> &SignRoster {
        &self.roster
    }

    /// Signs being driven, in draw order
    pub fn signs(&self) -> &[Sign] {
        self.roster.signs()
    }

    /// (width, height) shared by every sign
    pub fn size(&self) -> (u32, u32) {
        self.roster.size()
    }

    /// Draw a bitmap sequence
    ///
    /// Every bitmap must match the sign size or nothing is sent. When
    /// `hold` is set the call does not return until the last round has
    /// been visible for a while: one frame period after a multi-round
    /// draw, or the minimum hold after a single round. Without `hold` it
    /// returns as soon as the last round is written.
    pub async fn draw(&mut self, frames: Vec<Bitmap>, hold: bool) -> Result<(), DisplayError> {
        let expected = self.roster.size();
        if let Some(frame) = frames.iter().find(|frame| frame.size() != expected) {
            return Err(DisplayError::FrameSize {
                expected,
                actual: frame.size(),
            });
        }

        let rounds = Rounds::new(frames, self.roster.len(), self.roster.blank());
        let total = rounds.len();
        debug!("Drawing {} round(s), hold={}", total, hold);

        let mut ticker = time::interval(self.timing.frame_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for (index, round) in rounds.enumerate() {
            // First tick completes immediately
            ticker.tick().await;
            trace!("Round {}/{}", index + 1, total);
            self.send_round(round).await?;
        }

        if hold {
            if total > 1 {
                ticker.tick().await;
            } else {
                time::sleep(self.timing.min_hold()).await;
            }
        }
        Ok(())
    }

    async fn send_round(&mut self, round: Vec<Bitmap>) -> Result<(), TransportError> {
        let deadline = self.timing.call_deadline();
        for (sign, image) in self.roster.signs().iter().zip(&round) {
            with_deadline(deadline, self.transport.draw(&sign.name, image)).await?;
        }
        Ok(())
    }

    pub async fn light_on(&mut self) -> Result<(), DisplayError> {
        self.light(true).await
    }

    pub async fn light_off(&mut self) -> Result<(), DisplayError> {
        self.light(false).await
    }

    async fn light(&mut self, on: bool) -> Result<(), DisplayError> {
        info!("Switching lights {}", if on { "on" } else { "off" });
        with_deadline(self.timing.call_deadline(), self.transport.light(on)).await?;
        Ok(())
    }

    pub async fn test_start(&mut self) -> Result<(), DisplayError> {
        self.test(true).await
    }

    pub async fn test_stop(&mut self) -> Result<(), DisplayError> {
        self.test(false).await
    }

    async fn test(&mut self, start: bool) -> Result<(), DisplayError> {
        info!("{} test pattern", if start { "Starting" } else { "Stopping" });
        with_deadline(self.timing.call_deadline(), self.transport.test(start)).await?;
        Ok(())
    }
}

impl<T: SignTransport> Display for Flipdot<T> {
    async fn draw(&mut self, frames: Vec<Bitmap>, hold: bool) -> Result<(), DisplayError> {
        Flipdot::draw(self, frames, hold).await
    }
}
