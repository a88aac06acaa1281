//! Test doubles shared by the unit tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::time::Instant;

use flipapps_core::{Bitmap, ButtonState};
use flipapps_hal::{InputPin, OutputPin, PinError};
use flipapps_protocol::SignInfo;

use crate::button::ButtonControl;
use crate::display::{SignTransport, TransportError};
use crate::imaging::{Imager, ImagingError};

/// Distinct, never-blank 4x1 bitmap for `tag` in 0..7; the leftmost pixel
/// is always unlit
pub fn frame(tag: u32) -> Bitmap {
    let bits = tag + 1;
    let pixels = (0..4).map(|i| bits & (0b1000 >> i) != 0).collect();
    Bitmap::new(4, 1, pixels).unwrap()
}

#[track_caller]
pub fn assert_elapsed(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(50),
        "elapsed {:?}, expected {:?}",
        actual,
        expected
    );
}

/// A call received by [`RecordingTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetInfo,
    Draw { sign: String, image: Bitmap },
    Light(bool),
    Test(bool),
}

#[derive(Default)]
struct TransportState {
    calls: Vec<(Instant, Call)>,
    fail_draws: bool,
    draw_delay: Duration,
}

/// Sign transport that records every call; clones share the record
#[derive(Clone)]
pub struct RecordingTransport {
    signs: Vec<SignInfo>,
    state: Arc<Mutex<TransportState>>,
}

impl RecordingTransport {
    /// `count` signs named `sign-N`, all `width`x`height`
    pub fn new(count: usize, width: u32, height: u32) -> Self {
        Self::with_signs(
            (0..count)
                .map(|i| SignInfo {
                    name: format!("sign-{i}"),
                    width,
                    height,
                })
                .collect(),
        )
    }

    pub fn with_signs(signs: Vec<SignInfo>) -> Self {
        Self {
            signs,
            state: Arc::default(),
        }
    }

    pub fn clear(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn calls(&self) -> Vec<(Instant, Call)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn draws(&self) -> Vec<(Instant, String, Bitmap)> {
        self.calls()
            .into_iter()
            .filter_map(|(at, call)| match call {
                Call::Draw { sign, image } => Some((at, sign, image)),
                _ => None,
            })
            .collect()
    }

    pub fn fail_draws(&self, fail: bool) {
        self.state.lock().unwrap().fail_draws = fail;
    }

    pub fn set_draw_delay(&self, delay: Duration) {
        self.state.lock().unwrap().draw_delay = delay;
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push((Instant::now(), call));
    }
}

impl SignTransport for RecordingTransport {
    async fn get_info(&mut self) -> Result<Vec<SignInfo>, TransportError> {
        self.record(Call::GetInfo);
        Ok(self.signs.clone())
    }

    async fn draw(&mut self, sign: &str, image: &Bitmap) -> Result<(), TransportError> {
        self.record(Call::Draw {
            sign: sign.to_string(),
            image: image.clone(),
        });
        let (fail, delay) = {
            let state = self.state.lock().unwrap();
            (state.fail_draws, state.draw_delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(TransportError::Closed);
        }
        Ok(())
    }

    async fn light(&mut self, on: bool) -> Result<(), TransportError> {
        self.record(Call::Light(on));
        Ok(())
    }

    async fn test(&mut self, start: bool) -> Result<(), TransportError> {
        self.record(Call::Test(start));
        Ok(())
    }
}

/// Trigger pin whose level the test sets
#[derive(Clone, Default)]
pub struct FakeInput {
    level: Arc<AtomicBool>,
    broken: Arc<AtomicBool>,
}

impl FakeInput {
    pub fn set(&self, high: bool) {
        self.level.store(high, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.broken.store(fail, Ordering::SeqCst);
    }
}

impl InputPin for FakeInput {
    fn is_high(&mut self) -> Result<bool, PinError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(PinError::Read);
        }
        Ok(self.level.load(Ordering::SeqCst))
    }
}

/// LED pin that records every level written
#[derive(Clone, Default)]
pub struct FakeOutput {
    writes: Arc<Mutex<Vec<bool>>>,
    broken: Arc<AtomicBool>,
}

impl FakeOutput {
    /// Failed writes are not recorded
    pub fn fail_writes(&self, fail: bool) {
        self.broken.store(fail, Ordering::SeqCst);
    }

    fn write(&self, high: bool) -> Result<(), PinError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(PinError::Write);
        }
        self.writes.lock().unwrap().push(high);
        Ok(())
    }

    pub fn writes(&self) -> Vec<bool> {
        self.writes.lock().unwrap().clone()
    }

    pub fn rising_edges(&self) -> usize {
        self.writes().iter().filter(|&&high| high).count()
    }

    pub fn is_high(&self) -> bool {
        self.writes().last().copied().unwrap_or(false)
    }
}

impl OutputPin for FakeOutput {
    fn set_high(&mut self) -> Result<(), PinError> {
        self.write(true)
    }

    fn set_low(&mut self) -> Result<(), PinError> {
        self.write(false)
    }
}

/// Button control that records requested states
#[derive(Clone, Default)]
pub struct RecordingButton {
    states: Arc<Mutex<Vec<ButtonState>>>,
}

impl RecordingButton {
    pub fn states(&self) -> Vec<ButtonState> {
        self.states.lock().unwrap().clone()
    }
}

impl ButtonControl for RecordingButton {
    async fn set_state(&self, state: ButtonState) {
        self.states.lock().unwrap().push(state);
    }
}

/// Imager producing recognizable 4x1 bitmaps
///
/// Clock faces light the leftmost pixel, which [`frame`] never does (plus
/// the rightmost when a message is pending); message text renders as one
/// frame per character.
#[derive(Clone, Default)]
pub struct MarkerImager;

impl MarkerImager {
    pub fn clock_face(pending: bool) -> Bitmap {
        Bitmap::new(4, 1, vec![true, false, false, pending]).unwrap()
    }

    pub fn is_clock_face(bitmap: &Bitmap) -> bool {
        *bitmap == Self::clock_face(false) || *bitmap == Self::clock_face(true)
    }
}

impl Imager for MarkerImager {
    fn message(&self, _sender: &str, text: &str) -> Result<Vec<Bitmap>, ImagingError> {
        Ok(text.chars().map(|c| frame(c as u32 % 7)).collect())
    }

    fn clock(&self, _now: &NaiveDateTime, pending: bool) -> Result<Vec<Bitmap>, ImagingError> {
        Ok(vec![Self::clock_face(pending)])
    }
}
