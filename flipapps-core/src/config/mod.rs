//! Configuration types
//!
//! Runtime-independent timing configuration. The application crate
//! deserializes these from the `[button]`, `[display]` and `[application]`
//! tables of its TOML file; any key left out takes the default below.

pub mod timing;

pub use timing::*;
