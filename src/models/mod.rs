//! Data models for the CityWeather application
//!
//! - City: the validated city name from the form
//! - Location: geographic coordinates resolved from a city name
//! - Weather: current readings and hourly forecast rows
//! - Forecast: the display window and the assembled lookup result

pub mod city;
pub mod forecast;
pub mod location;
pub mod weather;

pub use city::CityQuery;
pub use forecast::{ForecastWindow, WeatherResult, WindowEntry};
pub use location::Coordinates;
pub use weather::{CurrentReading, HourlyRow, Reading};
