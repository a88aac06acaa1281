//! FlipApps Wire Protocol
//!
//! This crate defines the framed protocol spoken on both network links of
//! the controller: the link to the sign driver (which owns the flip-dot
//! hardware) and the ingress link clients use to queue messages.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬──────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH   │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 2B (LE)  │ 1B   │ 0–4096B     │ 1B       │
//! └───────┴──────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! Payloads are postcard-encoded request/response enums. Bitmaps travel
//! bit-packed, row-major, most significant bit first.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod frame;
pub mod messages;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{
    DriverRequest, DriverResponse, ErrorCode, FrameMessage, ServiceRequest, ServiceResponse,
    SignInfo, WireBitmap, WireMessage, WirePayload,
};
