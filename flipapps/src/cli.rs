use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "flipapps", version, about = "Flip-dot sign controller")]
pub struct Cli {
    /// Path of the configuration file
    #[arg(long, short, env = "FLIPAPPS_CONFIG", default_value = "flipapps.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The requested command; `run` when none is given
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the controller
    Run,
    /// Switch the sign backlights
    Light {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Start or stop the sign driver's test pattern
    Test {
        #[arg(value_enum)]
        action: TestAction,
    },
    /// Write text straight to the signs, wrapped and staggered across them
    Text {
        text: String,
        /// Built-in font to use instead of the configured one
        #[arg(long, short)]
        font: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestAction {
    Start,
    Stop,
}
