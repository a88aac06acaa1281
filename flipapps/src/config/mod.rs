//! Application configuration
//!
//! Read once at startup from a TOML file. Timing sections reuse the
//! structures from `flipapps_core::config`, so every timing key is
//! optional.
//!
//! ```toml
//! [driver]
//! address = "localhost:5001"
//!
//! [server]
//! address = "0.0.0.0:5002"
//! password = "secret"
//!
//! [button]
//! trigger_line = 17
//! led_line = 27
//! flash_period_ms = 1000
//!
//! [display]
//! frame_period_ms = 5000
//!
//! [imaging]
//! font = "5x7"
//! ```

mod loader;

use std::time::Duration;

use serde::Deserialize;

use flipapps_core::config::{AppTiming, ButtonTiming, DisplayTiming};

pub use loader::{load, parse, ConfigError};

/// Complete configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub driver: DriverConfig,
    pub server: ServerConfig,
    pub button: ButtonConfig,
    #[serde(default)]
    pub display: DisplayTiming,
    #[serde(default)]
    pub application: AppTiming,
    #[serde(default)]
    pub imaging: ImagingConfig,
}

/// Where the sign driver listens
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub address: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: "localhost:5001".into(),
        }
    }
}

/// Ingress service settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_address")]
    pub address: String,
    pub password: String,
    /// Lifetime of an issued token
    #[serde(default = "default_token_expiry")]
    pub token_expiry_s: u64,
}

fn default_server_address() -> String {
    "0.0.0.0:5002".into()
}

fn default_token_expiry() -> u64 {
    3600
}

impl ServerConfig {
    pub fn token_expiry(&self) -> Duration {
        Duration::from_secs(self.token_expiry_s)
    }
}

/// Push-button wiring and timing
#[derive(Debug, Clone, Deserialize)]
pub struct ButtonConfig {
    #[serde(default = "default_gpio_chip")]
    pub gpio_chip: String,
    pub trigger_line: u32,
    pub led_line: u32,
    #[serde(flatten)]
    pub timing: ButtonTiming,
}

fn default_gpio_chip() -> String {
    "/dev/gpiochip0".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagingConfig {
    /// Built-in mono font, by `WxH` name
    pub font: String,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self { font: "5x7".into() }
    }
}
