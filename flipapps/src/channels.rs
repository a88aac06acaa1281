//! Inter-task communication channels
//!
//! Capacities and endpoint aliases for the tokio channels connecting the
//! ingress service, the application run loop and the button manager.

use tokio::sync::mpsc;

use flipapps_core::{ButtonPress, ButtonState, MessageRequest};

/// Pending state changes queued for the button manager
pub const BUTTON_STATE_QUEUE_SIZE: usize = 10;

/// Debounced presses awaiting the application; a press that finds the slot
/// full is dropped
pub const PRESS_CHANNEL_SIZE: usize = 1;

/// Send side of the application's inbound message queue
pub type MessageSender = mpsc::Sender<MessageRequest>;

/// Receive side of the button manager's press channel
pub type PressReceiver = mpsc::Receiver<ButtonPress>;

pub(crate) type StateSender = mpsc::Sender<ButtonState>;
pub(crate) type StateReceiver = mpsc::Receiver<ButtonState>;
