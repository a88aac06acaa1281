//! Sample-count debouncer
//!
//! Converts a stream of raw boolean pin samples into single press events.
//! A press registers only after `threshold` consecutive positive samples,
//! fires once, and re-arms only after a negative sample.
//!
//! ```text
//!          true               true × threshold
//!   Off ─────────▶ Transitioning ─────────────▶ Triggered (emit)
//!    ▲                  │ false                     │ false
//!    └──────────────────┴───────────────────────────┘
//! ```

/// Debouncer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Input is released
    Off,
    /// Input is high but has not been held long enough
    Transitioning,
    /// A press has been emitted; waiting for release
    Triggered,
}

/// Edge-triggered sample-count debouncer
#[derive(Debug, Clone)]
pub struct Debouncer {
    state: DebounceState,
    counter: u32,
    threshold: u32,
}

impl Debouncer {
    /// Create a debouncer that fires after `threshold` consecutive positive
    /// samples. A threshold of zero behaves as one.
    pub fn new(threshold: u32) -> Self {
        Self {
            state: DebounceState::Off,
            counter: 0,
            threshold: threshold.max(1),
        }
    }

    /// Feed one sample; returns `true` exactly once per debounced press
    pub fn sample(&mut self, active: bool) -> bool {
        match (self.state, active) {
            (DebounceState::Off, false) => false,
            (DebounceState::Off, true) => {
                self.counter = 1;
                self.advance()
            }
            (DebounceState::Transitioning, true) => {
                self.counter += 1;
                self.advance()
            }
            (DebounceState::Transitioning, false) | (DebounceState::Triggered, false) => {
                self.state = DebounceState::Off;
                self.counter = 0;
                false
            }
            (DebounceState::Triggered, true) => false,
        }
    }

    fn advance(&mut self) -> bool {
        if self.counter >= self.threshold {
            self.state = DebounceState::Triggered;
            true
        } else {
            self.state = DebounceState::Transitioning;
            false
        }
    }

    /// Return to the released state, discarding any partial press
    pub fn reset(&mut self) {
        self.state = DebounceState::Off;
        self.counter = 0;
    }

    /// Current state
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Consecutive positive samples required for a press
    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec;

    fn emissions(debouncer: &mut Debouncer, samples: &[bool]) -> Vec<usize> {
        samples
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| debouncer.sample(s).then_some(i))
            .collect()
    }

    #[test]
    fn test_exact_threshold_fires_once() {
        let mut debouncer = Debouncer::new(3);
        let fired = emissions(&mut debouncer, &[true, true, true, true, true]);

        assert_eq!(fired, [2]);
        assert_eq!(debouncer.state(), DebounceState::Triggered);
    }

    #[test]
    fn test_short_run_never_fires() {
        let mut debouncer = Debouncer::new(3);
        let fired = emissions(&mut debouncer, &[true, true, false, true, true, false]);

        assert!(fired.is_empty());
        assert_eq!(debouncer.state(), DebounceState::Off);
    }

    #[test]
    fn test_release_rearms() {
        let mut debouncer = Debouncer::new(2);
        let fired = emissions(&mut debouncer, &[true, true, true, false, true, true]);

        assert_eq!(fired, [1, 5]);
    }

    #[test]
    fn test_threshold_one_fires_on_first_sample() {
        let mut debouncer = Debouncer::new(1);
        assert!(debouncer.sample(true));
        assert!(!debouncer.sample(true));
    }

    #[test]
    fn test_zero_threshold_clamped() {
        assert_eq!(Debouncer::new(0).threshold(), 1);
    }

    #[test]
    fn test_reset_discards_partial_press() {
        let mut debouncer = Debouncer::new(3);
        debouncer.sample(true);
        debouncer.sample(true);
        debouncer.reset();

        assert_eq!(debouncer.state(), DebounceState::Off);
        assert!(!debouncer.sample(true));
        assert!(!debouncer.sample(true));
        assert!(debouncer.sample(true));
    }

    /// Indices at which a run of positives reaches `threshold`
    fn expected(samples: &[bool], threshold: usize) -> Vec<usize> {
        let mut run = 0;
        let mut out = Vec::new();
        for (i, &s) in samples.iter().enumerate() {
            run = if s { run + 1 } else { 0 };
            if run == threshold {
                out.push(i);
            }
        }
        out
    }

    proptest! {
        #[test]
        fn fires_once_per_run_of_threshold_positives(
            samples in proptest::collection::vec(any::<bool>(), 0..200),
            threshold in 1u32..12,
        ) {
            let mut debouncer = Debouncer::new(threshold);
            let fired = emissions(&mut debouncer, &samples);
            prop_assert_eq!(fired, expected(&samples, threshold as usize));
        }

        #[test]
        fn exact_run_from_off_fires_exactly_once(threshold in 1u32..64) {
            let mut debouncer = Debouncer::new(threshold);
            let samples: Vec<bool> = core::iter::repeat(true).take(threshold as usize).collect();
            prop_assert_eq!(emissions(&mut debouncer, &samples).len(), 1);
        }
    }
}
