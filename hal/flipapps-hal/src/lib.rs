//! FlipApps Hardware Abstraction Layer
//!
//! This crate defines the pin traits the button manager is written
//! against. Backends implement them for real hardware; tests implement
//! them with scripted fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  flipapps (button manager)              │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flipapps-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ flipapps-hal-   │
//!            │ linux (cdev)    │
//!            └─────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

pub use gpio::{InputPin, OutputPin, PinError};
