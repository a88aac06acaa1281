//! Configuration loading
//!
//! Parses and validates the TOML file. Any failure here is fatal at
//! startup.

use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use flipapps_core::config::TimingError;

use super::AppConfig;
use crate::imaging::{font_by_name, FONT_NAMES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid timing: {0}")]
    Timing(#[from] TimingError),
    #[error("unknown font {name:?}, expected one of {}", FONT_NAMES.join(", "))]
    UnknownFont { name: String },
    #[error("server.password must not be empty")]
    EmptyPassword,
    #[error("{0} must not be empty")]
    EmptyAddress(&'static str),
    #[error("server.token_expiry_s must be greater than zero")]
    ZeroExpiry,
}

/// Read, parse and validate the file at `path`
pub fn load(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    info!("Loading configuration from {}", path.display());

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// Parse and validate configuration text
pub fn parse(text: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.driver.address.trim().is_empty() {
        return Err(ConfigError::EmptyAddress("driver.address"));
    }
    if config.server.address.trim().is_empty() {
        return Err(ConfigError::EmptyAddress("server.address"));
    }
    if config.server.password.is_empty() {
        return Err(ConfigError::EmptyPassword);
    }
    if config.server.token_expiry_s == 0 {
        return Err(ConfigError::ZeroExpiry);
    }

    config.button.timing.validate()?;
    config.display.validate()?;
    config.application.validate()?;

    if font_by_name(&config.imaging.font).is_none() {
        return Err(ConfigError::UnknownFont {
            name: config.imaging.font.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const MINIMAL: &str = r#"
        [server]
        password = "secret"

        [button]
        trigger_line = 17
        led_line = 27
    "#;

    #[test]
    fn test_minimal_uses_defaults() {
        let config = parse(MINIMAL).unwrap();

        assert_eq!(config.driver.address, "localhost:5001");
        assert_eq!(config.server.address, "0.0.0.0:5002");
        assert_eq!(config.server.token_expiry(), Duration::from_secs(3600));
        assert_eq!(config.button.gpio_chip, "/dev/gpiochip0");
        assert_eq!(config.button.timing.flash_period(), Duration::from_secs(1));
        assert_eq!(config.button.timing.sample_period(), Duration::from_millis(1));
        assert_eq!(config.display.frame_period(), Duration::from_secs(5));
        assert_eq!(config.display.min_hold(), Duration::from_secs(2));
        assert_eq!(config.display.call_deadline(), Duration::from_secs(10));
        assert_eq!(config.application.message_capacity, 20);
        assert_eq!(config.application.tick_period(), Duration::from_secs(30));
        assert_eq!(config.imaging.font, "5x7");
    }

    #[test]
    fn test_full() {
        let config = parse(
            r#"
            [driver]
            address = "signs.local:5001"

            [server]
            address = "127.0.0.1:6000"
            password = "secret"
            token_expiry_s = 60

            [button]
            gpio_chip = "/dev/gpiochip1"
            trigger_line = 5
            led_line = 6
            flash_period_ms = 500
            debounce_window_ms = 100
            debounce_threshold = 20

            [display]
            frame_period_ms = 3000
            min_hold_ms = 1000
            call_deadline_ms = 4000

            [application]
            message_capacity = 5
            tick_period_ms = 10000

            [imaging]
            font = "4x6"
            "#,
        )
        .unwrap();

        assert_eq!(config.driver.address, "signs.local:5001");
        assert_eq!(config.server.token_expiry_s, 60);
        assert_eq!(config.button.gpio_chip, "/dev/gpiochip1");
        assert_eq!((config.button.trigger_line, config.button.led_line), (5, 6));
        assert_eq!(config.button.timing.sample_period(), Duration::from_millis(5));
        assert_eq!(config.display.frame_period_ms, 3000);
        assert_eq!(config.application.message_capacity, 5);
        assert_eq!(config.imaging.font, "4x6");
    }

    #[test]
    fn test_missing_password() {
        let result = parse(
            r#"
            [server]
            [button]
            trigger_line = 1
            led_line = 2
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_password() {
        let text = MINIMAL.replace("secret", "");
        assert!(matches!(parse(&text), Err(ConfigError::EmptyPassword)));
    }

    #[test]
    fn test_zero_timing_rejected() {
        let text = format!("{MINIMAL}\n[display]\nframe_period_ms = 0\n");
        assert!(matches!(
            parse(&text),
            Err(ConfigError::Timing(TimingError::ZeroPeriod(_)))
        ));

        let text = format!("{MINIMAL}\n[application]\nmessage_capacity = 0\n");
        assert!(matches!(
            parse(&text),
            Err(ConfigError::Timing(TimingError::ZeroCapacity))
        ));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let text = MINIMAL.replace("led_line = 27", "led_line = 27\ndebounce_threshold = 0");
        assert!(matches!(
            parse(&text),
            Err(ConfigError::Timing(TimingError::ZeroThreshold))
        ));
    }

    #[test]
    fn test_vanishing_sample_period_rejected() {
        let text = MINIMAL.replace(
            "led_line = 27",
            "led_line = 27\ndebounce_window_ms = 1\ndebounce_threshold = 2000000",
        );
        assert!(matches!(
            parse(&text),
            Err(ConfigError::Timing(TimingError::ZeroPeriod(_)))
        ));
    }

    #[test]
    fn test_unknown_font() {
        let text = format!("{MINIMAL}\n[imaging]\nfont = \"huge\"\n");
        assert!(matches!(
            parse(&text),
            Err(ConfigError::UnknownFont { .. })
        ));
    }

    #[test]
    fn test_empty_driver_address() {
        let text = format!("{MINIMAL}\n[driver]\naddress = \"\"\n");
        assert!(matches!(
            parse(&text),
            Err(ConfigError::EmptyAddress("driver.address"))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load("/nonexistent/flipapps.toml"),
            Err(ConfigError::Read { .. })
        ));
    }
}
