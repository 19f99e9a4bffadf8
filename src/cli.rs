//! Command-line arguments for the server binary

use std::path::PathBuf;

use clap::Parser;

use crate::config::CityWeatherConfig;

#[derive(Parser, Debug)]
#[command(name = "cityweather")]
#[command(about = "Current conditions and a six-hour forecast for any city")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Port to listen on, overrides `server.port`
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Applies flag overrides on top of the loaded configuration
    pub fn apply_to(&self, config: &mut CityWeatherConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
