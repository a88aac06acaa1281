//! Message types carried inside frames
//!
//! Two links share the frame format:
//! - Controller ↔ sign driver: [`DriverRequest`] / [`DriverResponse`]
//! - Client ↔ controller ingress: [`ServiceRequest`] / [`ServiceResponse`]
//!
//! Every message is postcard-encoded into the frame payload; the frame's
//! TYPE byte identifies which of the four enums the payload holds.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::frame::{Frame, FrameError};

// Message type IDs: controller → sign driver
pub const MSG_DRIVER_REQUEST: u8 = 0x01;
// Message type IDs: sign driver → controller
pub const MSG_DRIVER_RESPONSE: u8 = 0x02;
// Message type IDs: client → controller
pub const MSG_SERVICE_REQUEST: u8 = 0x10;
// Message type IDs: controller → client
pub const MSG_SERVICE_RESPONSE: u8 = 0x11;

/// A message that travels as the payload of a single frame
pub trait FrameMessage: Serialize + DeserializeOwned {
    /// Frame TYPE byte for this message
    const MSG_TYPE: u8;

    /// Encode this message into a frame
    fn to_frame(&self) -> Result<Frame, FrameError> {
        let payload = postcard::to_allocvec(self).map_err(|_| FrameError::Encode)?;
        Frame::new(Self::MSG_TYPE, &payload)
    }

    /// Parse a message from a frame
    fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        if frame.msg_type != Self::MSG_TYPE {
            return Err(FrameError::InvalidFrame);
        }
        postcard::from_bytes(&frame.payload).map_err(|_| FrameError::Decode)
    }
}

/// Dimensions and name of one sign, as reported by the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Bit-packed monochrome bitmap
///
/// Pixels are row-major, eight per byte, most significant bit first. The
/// final byte is zero-padded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBitmap {
    pub width: u32,
    pub height: u32,
    pub bits: Vec<u8>,
}

impl WireBitmap {
    /// Number of bytes needed to carry `pixels` pixels
    pub fn packed_len(pixels: usize) -> usize {
        pixels.div_ceil(8)
    }

    /// Pack a flat row-major pixel slice
    pub fn pack(width: u32, height: u32, pixels: &[bool]) -> Self {
        let mut bits = alloc::vec![0u8; Self::packed_len(pixels.len())];
        for (index, &on) in pixels.iter().enumerate() {
            if on {
                bits[index / 8] |= 0x80 >> (index % 8);
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Unpack into a flat row-major pixel vector
    ///
    /// Fails if the byte count does not match the declared dimensions.
    pub fn unpack(&self) -> Result<Vec<bool>, FrameError> {
        let pixels = (self.width as usize)
            .checked_mul(self.height as usize)
            .ok_or(FrameError::InvalidFrame)?;
        if self.bits.len() != Self::packed_len(pixels) {
            return Err(FrameError::InvalidFrame);
        }
        Ok((0..pixels)
            .map(|index| self.bits[index / 8] & (0x80 >> (index % 8)) != 0)
            .collect())
    }
}

/// Failure category reported across either link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Request was malformed or carried an unusable value
    InvalidArgument,
    /// Missing, invalid or expired credentials
    Unauthenticated,
    /// The receiving side cannot accept work right now
    Unavailable,
    /// Unexpected failure on the receiving side
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorCode::InvalidArgument => "invalid argument",
            ErrorCode::Unauthenticated => "unauthenticated",
            ErrorCode::Unavailable => "unavailable",
            ErrorCode::Internal => "internal error",
        };
        f.write_str(text)
    }
}

/// Requests from the controller to the sign driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverRequest {
    /// List the attached signs
    GetInfo,
    /// Show a bitmap on the named sign
    Draw { sign: String, image: WireBitmap },
    /// Switch the sign backlights
    Light { on: bool },
    /// Start or stop the driver's built-in test pattern
    Test { start: bool },
}

impl FrameMessage for DriverRequest {
    const MSG_TYPE: u8 = MSG_DRIVER_REQUEST;
}

/// Responses from the sign driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverResponse {
    /// Attached signs, in driver order
    Info { signs: Vec<SignInfo> },
    /// Request completed
    Ack,
    /// Request failed
    Error { code: ErrorCode, detail: String },
}

impl FrameMessage for DriverResponse {
    const MSG_TYPE: u8 = MSG_DRIVER_RESPONSE;
}

/// Payload of a queued message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WirePayload {
    Text(String),
    Images(Vec<WireBitmap>),
}

/// A message submitted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub from: String,
    /// `None` when the client sent neither text nor images
    pub payload: Option<WirePayload>,
}

/// Requests from a client to the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceRequest {
    /// Exchange the shared password for a session token
    Authenticate { password: String },
    /// List the signs the controller drives
    GetInfo { token: String },
    /// Queue a message for display
    SendMessage { token: String, message: WireMessage },
}

impl FrameMessage for ServiceRequest {
    const MSG_TYPE: u8 = MSG_SERVICE_REQUEST;
}

/// Responses from the controller to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceResponse {
    Token { token: String },
    Info { signs: Vec<SignInfo> },
    /// Message was queued
    Accepted,
    Error { code: ErrorCode, detail: String },
}

impl FrameMessage for ServiceResponse {
    const MSG_TYPE: u8 = MSG_SERVICE_RESPONSE;
}
