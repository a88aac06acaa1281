//! FlipApps flip-dot sign controller
//!
//! Arbitrates between three event sources and turns the result into
//! paced draw calls across a set of remote signs:
//!
//! - Queued messages arriving through the authenticated ingress service
//! - A physical push-button (with flashing LED) that releases one message per press
//! - A periodic clock face shown whenever nothing else is
//!
//! The binary in `main.rs` wires these together; every component takes its
//! collaborators through its constructor so tests can substitute fakes.

#![deny(unsafe_code)]

pub mod application;
pub mod button;
pub mod channels;
pub mod cli;
pub mod config;
pub mod display;
pub mod imaging;
pub mod ingress;
pub mod link;

#[cfg(test)]
pub(crate) mod testing;
