//! Sampler and flasher tasks
//!
//! Both run only while the button is `Active`. Each owns its pin for the
//! duration and hands it back through its join handle when stopped.

use std::future::Future;
use std::time::Duration;

use log::{debug, error, trace, warn};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use flipapps_core::{ButtonPress, Debouncer};
use flipapps_hal::{InputPin, OutputPin};

/// A spawned task that returns its pin when told to stop
pub(super) struct Activity<P> {
    stop: oneshot::Sender<()>,
    task: JoinHandle<P>,
}

impl<P: Send + 'static> Activity<P> {
    pub(super) fn spawn<F, Fut>(start: F) -> Self
    where
        F: FnOnce(oneshot::Receiver<()>) -> Fut,
        Fut: Future<Output = P> + Send + 'static,
    {
        let (stop, stop_rx) = oneshot::channel();
        Self {
            stop,
            task: tokio::spawn(start(stop_rx)),
        }
    }

    /// Signal the task and wait for the pin
    pub(super) async fn stop(self) -> Option<P> {
        // Already finished if the receiver is gone
        let _ = self.stop.send(());
        match self.task.await {
            Ok(pin) => Some(pin),
            Err(e) => {
                error!("Button task failed: {}", e);
                None
            }
        }
    }
}

/// Poll the trigger through a fresh debouncer until stopped
pub(super) async fn sample_trigger<I: InputPin>(
    mut trigger: I,
    period: Duration,
    threshold: u32,
    presses: mpsc::Sender<ButtonPress>,
    mut stop: oneshot::Receiver<()>,
) -> I {
    let mut debouncer = Debouncer::new(threshold);
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut read_failed = false;

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }

        let level = match trigger.is_high() {
            Ok(level) => {
                read_failed = false;
                level
            }
            Err(e) => {
                if !read_failed {
                    warn!("Trigger read failed: {}", e);
                    read_failed = true;
                }
                debouncer.reset();
                continue;
            }
        };

        if debouncer.sample(level) {
            match presses.try_send(ButtonPress) {
                Ok(()) => debug!("Button pressed"),
                Err(TrySendError::Full(_)) => warn!("Press not yet consumed, dropping"),
                Err(TrySendError::Closed(_)) => trace!("Press receiver gone"),
            }
        }
    }
    trigger
}

/// Toggle the LED every `period` until stopped, leaving it low
pub(super) async fn flash_led<O: OutputPin>(
    mut led: O,
    period: Duration,
    mut stop: oneshot::Receiver<()>,
) -> O {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut lit = false;
    let mut write_failed = false;

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }
        lit = !lit;
        match led.set_state(lit) {
            Ok(()) => write_failed = false,
            Err(e) => {
                if !write_failed {
                    warn!("LED write failed: {}", e);
                    write_failed = true;
                }
            }
        }
    }

    if let Err(e) = led.set_low() {
        warn!("Failed to clear LED: {}", e);
    }
    led
}
