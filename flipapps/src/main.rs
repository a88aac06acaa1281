//! FlipApps - Flip-dot Sign Controller
//!
//! Connects to the sign driver, claims the push-button GPIO lines and
//! serves the ingress protocol until interrupted. The `light` and `test`
//! subcommands issue a single driver command and exit; `text` writes a
//! phrase straight to the signs.

use anyhow::{Context, Result};
use clap::Parser;
use embedded_graphics::mono_font::MonoFont;
use log::{error, info};
use tokio::net::TcpListener;

use flipapps::application::Application;
use flipapps::button::ButtonManager;
use flipapps::cli::{Cli, Command, Switch, TestAction};
use flipapps::config::{self, AppConfig};
use flipapps::display::{Flipdot, TcpSignTransport};
use flipapps::imaging::{font_by_name, MonoTextBuilder, TextBuilder, TextImager};
use flipapps::ingress::{FlipAppsService, IngressServer, SessionAuthenticator};
use flipapps_core::ButtonState;
use flipapps_hal_linux::GpioChip;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    let transport = TcpSignTransport::new(config.driver.address.clone());
    let mut flipdot = Flipdot::connect(transport, config.display)
        .await
        .with_context(|| format!("connecting to sign driver at {}", config.driver.address))?;

    match cli.selected_command() {
        Command::Run => run(config, flipdot).await,
        Command::Light { state } => {
            match state {
                Switch::On => flipdot.light_on().await?,
                Switch::Off => flipdot.light_off().await?,
            }
            Ok(())
        }
        Command::Test { action } => {
            match action {
                TestAction::Start => flipdot.test_start().await?,
                TestAction::Stop => flipdot.test_stop().await?,
            }
            Ok(())
        }
        Command::Text { text, font } => {
            let font = font.as_deref().unwrap_or(&config.imaging.font);
            let (width, height) = flipdot.size();
            let builder = MonoTextBuilder::new(load_font(font)?, width, height)?;
            flipdot.draw(builder.images(&text, false), false).await?;
            Ok(())
        }
    }
}

fn load_font(name: &str) -> Result<&'static MonoFont<'static>> {
    font_by_name(name).with_context(|| format!("unknown font {name}"))
}

async fn run(config: AppConfig, flipdot: Flipdot<TcpSignTransport>) -> Result<()> {
    let (width, height) = flipdot.size();
    let signs = flipdot.roster().infos();

    let builder = MonoTextBuilder::new(load_font(&config.imaging.font)?, width, height)?;
    let imager = TextImager::new(builder, signs.len());

    let mut chip = GpioChip::open(&config.button.gpio_chip)?;
    let trigger = chip.input(config.button.trigger_line, "flipapps-trigger")?;
    let led = chip.output(config.button.led_line, "flipapps-led")?;
    let mut button = ButtonManager::spawn(trigger, led, config.button.timing);
    let presses = button
        .take_channel()
        .context("button press channel already taken")?;

    let app = Application::new(
        flipdot,
        button.handle(),
        presses,
        imager,
        config.application.message_capacity,
    );

    let auth = SessionAuthenticator::new(
        config.server.password.clone(),
        config.server.token_expiry(),
    );
    let service = FlipAppsService::new(auth, signs, app.messages_channel());
    let listener = TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("binding ingress on {}", config.server.address))?;
    let server = tokio::spawn(IngressServer::new(service).serve(listener));

    // Stopping the server drops the last message senders, which ends the app
    let shutdown = server.abort_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, shutting down");
                shutdown.abort();
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    app.run(config.application.tick_period()).await;

    button.set_state(ButtonState::Stopped).await;
    button.join().await;
    info!("Goodbye");
    Ok(())
}
