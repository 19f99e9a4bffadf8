use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use cityweather::cli::Cli;
use cityweather::config::CityWeatherConfig;
use cityweather::service::WeatherService;
use cityweather::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CityWeatherConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    cli.apply_to(&mut config);

    cityweather::logging::init(&config.logging, cli.verbose)?;
    info!("Starting cityweather {}", cityweather::VERSION);

    let service = WeatherService::from_config(&config)?;
    let app = web::router(AppState::new(service), config.request_timeout());

    web::run(&config, app).await
}
