//! Application run loop
//!
//! Arbitrates between queued messages, button presses and the clock tick.
//! Messages wait in a FIFO until the button is pressed; the button is armed
//! (flashing) whenever something is waiting. The clock is redrawn on every
//! tick except while a message is on the signs.
//!
//! Draws run as futures polled alongside the event sources, so the loop
//! only ever waits inside its `select!`. The display is moved into the
//! in-flight draw and handed back when it completes.

use std::collections::VecDeque;
use std::future::{pending, Future};
use std::pin::Pin;
use std::time::Duration;

use chrono::Local;
use log::{debug, error, info, trace, warn};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use flipapps_core::{Bitmap, ButtonPress, ButtonState, MessageError, MessageRequest, Payload};

use crate::button::ButtonControl;
use crate::channels::{MessageSender, PressReceiver};
use crate::display::{Display, DisplayError};
use crate::imaging::{Imager, ImagingError};

/// Why a message could not be turned into frames
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid message: {0}")]
    Message(#[from] MessageError),
    #[error("failed to render message: {0}")]
    Imaging(#[from] ImagingError),
}

/// The flip-dot application
pub struct Application<D, B, I> {
    display: D,
    button: B,
    presses: PressReceiver,
    imager: I,
    messages: mpsc::Receiver<MessageRequest>,
    sender: MessageSender,
}

impl<D, B, I> Application<D, B, I>
where
    D: Display + 'static,
    B: ButtonControl,
    I: Imager,
{
    /// Create the application with a message queue of `capacity`
    pub fn new(display: D, button: B, presses: PressReceiver, imager: I, capacity: usize) -> Self {
        let (sender, messages) = mpsc::channel(capacity.max(1));
        Self {
            display,
            button,
            presses,
            imager,
            messages,
            sender,
        }
    }

    /// Sender for queueing messages; sends wait while the queue is full
    pub fn messages_channel(&self) -> MessageSender {
        self.sender.clone()
    }

    /// Run until every message sender has been dropped
    ///
    /// A message already on the signs is allowed to finish first.
    pub async fn run(self, tick_period: Duration) {
        let Self {
            display,
            button,
            mut presses,
            imager,
            mut messages,
            sender,
        } = self;
        drop(sender);

        info!("Application started");
        let mut state = RunState::new(display, button, imager);
        state.draw_clock();

        let mut ticker = time::interval_at(Instant::now() + tick_period, tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut accepting = true;
        let mut presses_open = true;

        loop {
            if !accepting && !state.is_drawing() {
                break;
            }

            tokio::select! {
                message = messages.recv(), if accepting => match message {
                    Some(message) => state.on_message(message).await,
                    None => {
                        info!("Message channel closed");
                        accepting = false;
                    }
                },
                press = presses.recv(), if accepting && presses_open => match press {
                    Some(ButtonPress) => state.on_press().await,
                    None => {
                        warn!("Button press channel closed");
                        presses_open = false;
                    }
                },
                _ = ticker.tick(), if accepting => state.on_tick(),
                (kind, display, result) = state.next_done(), if state.is_drawing() => {
                    state.on_done(kind, display, result).await;
                }
            }
        }
        info!("Application stopped");
    }
}

type Draw<D> = Pin<Box<dyn Future<Output = (D, Result<(), DisplayError>)>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Clock,
    Message,
}

struct InFlight<D> {
    kind: Job,
    draw: Draw<D>,
}

struct RunState<D, B, I> {
    /// `None` while a draw is in flight
    display: Option<D>,
    in_flight: Option<InFlight<D>>,
    button: B,
    imager: I,
    pending: VecDeque<MessageRequest>,
    /// Message frames waiting for a clock draw to finish
    queued: Option<Vec<Bitmap>>,
    /// Clock needs redrawing once the display is free
    repaint: bool,
    armed: bool,
}

impl<D, B, I> RunState<D, B, I>
where
    D: Display + 'static,
    B: ButtonControl,
    I: Imager,
{
    fn new(display: D, button: B, imager: I) -> Self {
        Self {
            display: Some(display),
            in_flight: None,
            button,
            imager,
            pending: VecDeque::new(),
            queued: None,
            repaint: false,
            armed: false,
        }
    }

    /// A message is being shown or is about to be
    fn paused(&self) -> bool {
        self.queued.is_some()
            || matches!(&self.in_flight, Some(InFlight { kind: Job::Message, .. }))
    }

    fn is_drawing(&self) -> bool {
        self.in_flight.is_some() || self.queued.is_some()
    }

    async fn on_message(&mut self, message: MessageRequest) {
        debug!("Queued message from {}", message.sender);
        self.pending.push_back(message);

        if self.pending.len() == 1 && !self.paused() {
            self.arm(true).await;
            self.draw_clock();
        }
    }

    async fn on_press(&mut self) {
        if self.paused() {
            debug!("Press ignored while a message is showing");
            return;
        }
        let Some(message) = self.pending.pop_front() else {
            debug!("Press ignored, no messages waiting");
            return;
        };

        info!("Showing message from {}", message.sender);
        self.arm(false).await;

        let sender = message.sender.clone();
        match self.render(message) {
            Ok(frames) if self.display.is_some() => self.start(Job::Message, frames, true),
            Ok(frames) => self.queued = Some(frames),
            Err(e) => {
                error!("Dropping message from {}: {}", sender, e);
                self.rearm().await;
            }
        }
    }

    fn on_tick(&mut self) {
        if self.paused() {
            trace!("Tick skipped while a message is showing");
            return;
        }
        trace!("Tick");
        self.draw_clock();
    }

    /// Wait for the in-flight draw; never completes if there is none
    async fn next_done(&mut self) -> (Job, D, Result<(), DisplayError>) {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return pending().await;
        };
        let (display, result) = in_flight.draw.as_mut().await;
        let kind = in_flight.kind;
        self.in_flight = None;
        (kind, display, result)
    }

    async fn on_done(&mut self, kind: Job, display: D, result: Result<(), DisplayError>) {
        self.display = Some(display);

        match (kind, result) {
            (Job::Clock, Err(e)) => warn!("Clock refresh failed: {}", e),
            (Job::Message, Err(e)) => error!("Failed to show message: {}", e),
            (_, Ok(())) => debug!("{:?} draw finished", kind),
        }

        if kind == Job::Message {
            self.rearm().await;
        }

        if let Some(frames) = self.queued.take() {
            self.start(Job::Message, frames, true);
        } else if self.repaint {
            self.repaint = false;
            self.draw_clock();
        }
    }

    /// Draw the clock unless a message is showing
    fn draw_clock(&mut self) {
        if self.paused() {
            return;
        }
        if self.display.is_none() {
            self.repaint = true;
            return;
        }

        let now = Local::now().naive_local();
        match self.imager.clock(&now, !self.pending.is_empty()) {
            Ok(frames) => self.start(Job::Clock, frames, false),
            Err(e) => warn!("Failed to render clock: {}", e),
        }
    }

    fn render(&self, message: MessageRequest) -> Result<Vec<Bitmap>, DispatchError> {
        match message.payload {
            Some(Payload::Text(text)) => Ok(self.imager.message(&message.sender, &text)?),
            Some(Payload::Images(images)) => Ok(images),
            None => Err(MessageError::MissingPayload.into()),
        }
    }

    fn start(&mut self, kind: Job, frames: Vec<Bitmap>, hold: bool) {
        let Some(mut display) = self.display.take() else {
            error!("Display busy, dropping {:?} draw", kind);
            return;
        };
        debug!("Starting {:?} draw of {} frame(s)", kind, frames.len());

        self.in_flight = Some(InFlight {
            kind,
            draw: Box::pin(async move {
                let result = display.draw(frames, hold).await;
                (display, result)
            }),
        });
    }

    /// Re-arm the button if more messages are waiting
    async fn rearm(&mut self) {
        if !self.pending.is_empty() {
            self.arm(true).await;
        }
    }

    async fn arm(&mut self, active: bool) {
        if self.armed == active {
            return;
        }
        self.armed = active;
        let state = if active {
            ButtonState::Active
        } else {
            ButtonState::Inactive
        };
        self.button.set_state(state).await;
    }
}
