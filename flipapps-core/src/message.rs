//! Queued display messages
//!
//! A message carries either text (rendered on the controller) or a
//! ready-made bitmap sequence. A request with neither is representable on
//! the wire and is rejected by [`MessageRequest::payload`].

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use flipapps_protocol::{WireMessage, WirePayload};

use crate::display::{Bitmap, BitmapError};

/// Message validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// Neither text nor images were supplied
    MissingPayload,
    /// An attached image could not be decoded
    InvalidImage(BitmapError),
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::MissingPayload => f.write_str("message has neither text nor images"),
            MessageError::InvalidImage(e) => write!(f, "invalid image: {e}"),
        }
    }
}

impl core::error::Error for MessageError {}

/// What to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Images(Vec<Bitmap>),
}

/// A message waiting to be displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRequest {
    pub sender: String,
    pub payload: Option<Payload>,
}

impl MessageRequest {
    pub fn text(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            payload: Some(Payload::Text(text.into())),
        }
    }

    pub fn images(sender: impl Into<String>, images: Vec<Bitmap>) -> Self {
        Self {
            sender: sender.into(),
            payload: Some(Payload::Images(images)),
        }
    }

    /// The payload, or [`MessageError::MissingPayload`]
    pub fn payload(&self) -> Result<&Payload, MessageError> {
        self.payload.as_ref().ok_or(MessageError::MissingPayload)
    }

    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            from: self.sender.clone(),
            payload: self.payload.as_ref().map(|payload| match payload {
                Payload::Text(text) => WirePayload::Text(text.clone()),
                Payload::Images(images) => {
                    WirePayload::Images(images.iter().map(Bitmap::to_wire).collect())
                }
            }),
        }
    }
}

impl TryFrom<WireMessage> for MessageRequest {
    type Error = MessageError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let payload = match wire.payload {
            None => None,
            Some(WirePayload::Text(text)) => Some(Payload::Text(text)),
            Some(WirePayload::Images(images)) => Some(Payload::Images(
                images
                    .iter()
                    .map(Bitmap::try_from)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(MessageError::InvalidImage)?,
            )),
        };
        Ok(Self {
            sender: wire.from,
            payload,
        })
    }
}
