//! `CityWeather` - current conditions and a six-hour forecast for a city
//!
//! A city name is resolved to coordinates (OpenCage), a forecast is fetched
//! for them (Open-Meteo), normalized into rounded readings and an hourly
//! table, and cut down to the hours shown on the page.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod logging;
pub mod models;
pub mod service;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::CityWeatherConfig;
pub use error::WeatherError;
pub use geocoding::{Geocoder, OpenCageGeocoder};
pub use models::{
    CityQuery, Coordinates, CurrentReading, ForecastWindow, HourlyRow, WeatherResult,
};
pub use service::WeatherService;
pub use weather::{ForecastProvider, OpenMeteoProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
