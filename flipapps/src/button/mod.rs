//! Button manager
//!
//! Owns the trigger and LED pins. While `Active` it flashes the LED and
//! samples the trigger through a fresh [`Debouncer`], delivering one
//! [`ButtonPress`] per debounced press. While `Inactive` the LED is dark
//! and the trigger is ignored. `Stopped` shuts everything down and closes
//! the press channel.
//!
//! State changes are queued to a control task so callers never wait on
//! the manager's own scheduling.
//!
//! [`Debouncer`]: flipapps_core::Debouncer

mod tasks;

use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use flipapps_core::config::ButtonTiming;
use flipapps_core::{ButtonPress, ButtonState};
use flipapps_hal::{InputPin, OutputPin};

use crate::channels::{
    PressReceiver, StateReceiver, StateSender, BUTTON_STATE_QUEUE_SIZE, PRESS_CHANNEL_SIZE,
};

/// Something that accepts button state changes
///
/// The application run loop is written against this trait.
#[allow(async_fn_in_trait)]
pub trait ButtonControl {
    async fn set_state(&self, state: ButtonState);
}

/// Cloneable handle for requesting state changes
#[derive(Clone)]
pub struct ButtonHandle {
    states: StateSender,
}

impl ButtonControl for ButtonHandle {
    async fn set_state(&self, state: ButtonState) {
        debug!("Requesting button state {:?}", state);
        if self.states.send(state).await.is_err() {
            warn!("Button manager already stopped, ignoring {:?}", state);
        }
    }
}

/// Running button manager
pub struct ButtonManager {
    handle: ButtonHandle,
    presses: Option<PressReceiver>,
    task: JoinHandle<()>,
}

impl ButtonManager {
    /// Spawn the manager's control task; it starts `Inactive`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<I, O>(trigger: I, led: O, timing: ButtonTiming) -> Self
    where
        I: InputPin + Send + 'static,
        O: OutputPin + Send + 'static,
    {
        let (state_tx, state_rx) = mpsc::channel(BUTTON_STATE_QUEUE_SIZE);
        let (press_tx, press_rx) = mpsc::channel(PRESS_CHANNEL_SIZE);
        let task = tokio::spawn(control_task(trigger, led, timing, state_rx, press_tx));

        Self {
            handle: ButtonHandle { states: state_tx },
            presses: Some(press_rx),
            task,
        }
    }

    /// Handle for requesting state changes from other tasks
    pub fn handle(&self) -> ButtonHandle {
        self.handle.clone()
    }

    /// Request a state change
    pub async fn set_state(&self, state: ButtonState) {
        self.handle.set_state(state).await;
    }

    /// The receive-only press channel
    ///
    /// Handed out once; later calls return `None`. The channel yields
    /// `None` after the manager stops.
    pub fn take_channel(&mut self) -> Option<PressReceiver> {
        self.presses.take()
    }

    /// Wait for the control task to finish after `Stopped`
    pub async fn join(self) {
        let Self { handle, task, .. } = self;
        drop(handle);
        if let Err(e) = task.await {
            error!("Button manager task failed: {}", e);
        }
    }
}

/// Pins are either parked with the control task or lent to the running
/// sampler and flasher
enum Pins<I, O> {
    Parked { trigger: I, led: O },
    Lent {
        sampler: tasks::Activity<I>,
        flasher: tasks::Activity<O>,
    },
    Lost,
}

impl<I, O> Pins<I, O>
where
    I: InputPin + Send + 'static,
    O: OutputPin + Send + 'static,
{
    fn start(self, timing: &ButtonTiming, presses: &mpsc::Sender<ButtonPress>) -> Self {
        match self {
            Pins::Parked { trigger, led } => Pins::Lent {
                sampler: tasks::Activity::spawn(|stop| {
                    tasks::sample_trigger(
                        trigger,
                        timing.sample_period(),
                        timing.debounce_threshold,
                        presses.clone(),
                        stop,
                    )
                }),
                flasher: tasks::Activity::spawn(|stop| {
                    tasks::flash_led(led, timing.flash_period(), stop)
                }),
            },
            other => other,
        }
    }

    async fn stop(self) -> Self {
        match self {
            Pins::Lent { sampler, flasher } => {
                match (sampler.stop().await, flasher.stop().await) {
                    (Some(trigger), Some(led)) => Pins::Parked { trigger, led },
                    _ => {
                        error!("Button pins lost; the button stays disabled");
                        Pins::Lost
                    }
                }
            }
            other => other,
        }
    }
}

async fn control_task<I, O>(
    trigger: I,
    mut led: O,
    timing: ButtonTiming,
    mut states: StateReceiver,
    presses: mpsc::Sender<ButtonPress>,
) where
    I: InputPin + Send + 'static,
    O: OutputPin + Send + 'static,
{
    info!("Button manager started");

    if let Err(e) = led.set_low() {
        warn!("Failed to clear LED: {}", e);
    }
    let mut pins = Pins::Parked { trigger, led };
    let mut current = ButtonState::Inactive;

    while let Some(requested) = states.recv().await {
        if requested == current {
            debug!("Button already {:?}", current);
            continue;
        }
        info!("Button {:?} -> {:?}", current, requested);

        match requested {
            ButtonState::Active => {
                pins = pins.start(&timing, &presses);
            }
            ButtonState::Inactive => {
                pins = pins.stop().await;
            }
            ButtonState::Stopped => break,
        }
        current = requested;
    }

    // Flasher leaves the LED low when it stops
    if let Pins::Parked { mut led, .. } = pins.stop().await {
        if let Err(e) = led.set_low() {
            warn!("Failed to clear LED: {}", e);
        }
    }
    info!("Button manager stopped");
}
