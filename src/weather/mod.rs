//! Forecast fetching from Open-Meteo.
//!
//! The current and hourly variable lists are fixed and ordered. Responses are
//! turned into a [`ProviderForecast`] whose blocks address each variable by
//! name through a [`VariableSet`] built from the exact list that was sent.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::http::HttpFetcher;
use crate::models::Coordinates;
use crate::{Result, WeatherError};

pub mod normalize;
pub mod open_meteo;
pub mod window;

/// Current variables, in request order
pub const CURRENT_VARIABLES: [&str; 6] = [
    "temperature_2m",
    "relative_humidity_2m",
    "precipitation",
    "surface_pressure",
    "wind_speed_10m",
    "wind_gusts_10m",
];

/// Hourly variables, in request order
pub const HOURLY_VARIABLES: [&str; 6] = [
    "temperature_2m",
    "relative_humidity_2m",
    "precipitation_probability",
    "surface_pressure",
    "wind_speed_10m",
    "wind_gusts_10m",
];

/// Values keyed by variable name, kept in the order the variables were requested
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSet<T> {
    entries: Vec<(&'static str, T)>,
}

impl<T> VariableSet<T> {
    /// Pairs `names` with `values`; a length mismatch is a shape error.
    pub fn new(names: &[&'static str], values: Vec<T>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(WeatherError::shape(format!(
                "{} variables requested but {} returned",
                names.len(),
                values.len()
            )));
        }
        Ok(Self {
            entries: names.iter().copied().zip(values).collect(),
        })
    }

    #[must_use]
    pub fn by_index(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(_, v)| v)
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The provider's "current" block. Values are kept raw so that
/// non-numeric cells can be recovered from during extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentBlock {
    pub time: DateTime<Utc>,
    pub values: VariableSet<Value>,
}

/// The provider's "hourly" block: a regular grid `[start, end)` stepped by `interval`
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyBlock {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub interval: TimeDelta,
    pub columns: VariableSet<Vec<Option<f64>>>,
}

/// A forecast response, ready for normalization
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderForecast {
    pub current: CurrentBlock,
    pub hourly: HourlyBlock,
}

/// Fetches current and hourly forecasts for a coordinate pair
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch(&self, coordinates: Coordinates) -> Result<ProviderForecast>;
}

/// Open-Meteo `/forecast` client
pub struct OpenMeteoProvider {
    http: HttpFetcher,
    base_url: String,
}

impl OpenMeteoProvider {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn forecast_url(&self, coordinates: Coordinates) -> Result<Url> {
        let endpoint = format!("{}/forecast", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(
            &endpoint,
            &[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("current", CURRENT_VARIABLES.join(",")),
                ("hourly", HOURLY_VARIABLES.join(",")),
                ("timeformat", "unixtime".to_string()),
                ("timezone", "GMT".to_string()),
            ],
        )
        .map_err(|e| WeatherError::config(format!("Invalid forecast base URL '{endpoint}': {e}")))
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn fetch(&self, coordinates: Coordinates) -> Result<ProviderForecast> {
        info!(
            "Getting forecast for coordinates: {}",
            coordinates.format_coordinates()
        );
        let url = self.forecast_url(coordinates)?;

        let response: open_meteo::ForecastResponse = self.http.get_json(&url).await?;
        let forecast = response.into_provider_forecast(&CURRENT_VARIABLES, &HOURLY_VARIABLES)?;

        debug!(
            "Hourly grid {} .. {} every {}s",
            forecast.hourly.start,
            forecast.hourly.end,
            forecast.hourly.interval.num_seconds()
        );
        Ok(forecast)
    }
}
