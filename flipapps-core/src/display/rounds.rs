//! Round planning
//!
//! A draw call fans a bitmap sequence across every sign. Each round
//! assigns one bitmap per sign, in roster order, consuming the sequence
//! left to right. The final round pads every sign that has nothing left
//! to show with a blank, so stale content never lingers.
//!
//! An empty sequence still yields one round of blanks.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use super::bitmap::Bitmap;

/// Iterator over draw rounds, each exactly `signs` bitmaps long
#[derive(Debug, Clone)]
pub struct Rounds {
    frames: VecDeque<Bitmap>,
    signs: usize,
    blank: Bitmap,
    started: bool,
}

impl Rounds {
    /// Plan rounds for `frames` across `signs` signs
    ///
    /// `signs` of zero is treated as one.
    pub fn new(frames: Vec<Bitmap>, signs: usize, blank: Bitmap) -> Self {
        Self {
            frames: frames.into(),
            signs: signs.max(1),
            blank,
            started: false,
        }
    }

    /// Whether every round has been yielded
    pub fn is_finished(&self) -> bool {
        self.started && self.frames.is_empty()
    }

    /// Rounds still to be yielded
    pub fn remaining(&self) -> usize {
        if self.is_finished() {
            0
        } else {
            self.frames.len().div_ceil(self.signs).max(1)
        }
    }
}

impl Iterator for Rounds {
    type Item = Vec<Bitmap>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_finished() {
            return None;
        }
        self.started = true;

        let take = self.frames.len().min(self.signs);
        let mut round: Vec<Bitmap> = self.frames.drain(..take).collect();
        round.resize(self.signs, self.blank.clone());
        Some(round)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rounds {}
