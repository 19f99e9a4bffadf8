//! City weather lookup
//!
//! Runs one request through the pipeline: resolve the city, fetch the
//! forecast, normalize it, cut the display window and assemble the result.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::cache::ResponseCache;
use crate::config::CityWeatherConfig;
use crate::geocoding::{Geocoder, OpenCageGeocoder};
use crate::http::HttpFetcher;
use crate::models::{CityQuery, WeatherResult};
use crate::weather::window::HourWindow;
use crate::weather::{ForecastProvider, OpenMeteoProvider, normalize};
use crate::{Result, WeatherError};

pub struct WeatherService {
    geocoder: Arc<dyn Geocoder>,
    provider: Arc<dyn ForecastProvider>,
}

impl WeatherService {
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>, provider: Arc<dyn ForecastProvider>) -> Self {
        Self { geocoder, provider }
    }

    /// Builds the OpenCage and Open-Meteo clients described by `config`.
    ///
    /// Both share one response cache when caching is enabled.
    pub fn from_config(config: &CityWeatherConfig) -> anyhow::Result<Self> {
        let cache = if config.cache.enabled {
            let location = Path::new(&config.cache.location);
            let cache = ResponseCache::open(location, Duration::from_secs(config.cache.ttl_seconds))
                .with_context(|| format!("Failed to open response cache at {}", location.display()))?;
            info!("Response cache enabled at {}", location.display());
            Some(cache)
        } else {
            None
        };

        let api_key = config
            .geocoding
            .api_key
            .clone()
            .ok_or_else(|| WeatherError::config("Geocoding API key is required"))?;

        let geocoding_http = HttpFetcher::new(
            "geocoding",
            Duration::from_secs(u64::from(config.geocoding.timeout_seconds)),
            config.geocoding.max_retries,
            cache.clone(),
        )?;
        let forecast_http = HttpFetcher::new(
            "forecast",
            Duration::from_secs(u64::from(config.forecast.timeout_seconds)),
            config.forecast.max_retries,
            cache,
        )?;

        Ok(Self::new(
            Arc::new(OpenCageGeocoder::new(
                geocoding_http,
                &config.geocoding.base_url,
                api_key,
            )),
            Arc::new(OpenMeteoProvider::new(
                forecast_http,
                &config.forecast.base_url,
            )),
        ))
    }

    pub async fn lookup(&self, city: &CityQuery) -> Result<WeatherResult> {
        self.lookup_at(city, Utc::now()).await
    }

    /// Lookup with the window anchored at `now` instead of the wall clock
    #[instrument(skip(self), fields(city = %city))]
    pub async fn lookup_at(&self, city: &CityQuery, now: DateTime<Utc>) -> Result<WeatherResult> {
        let coordinates = self.geocoder.resolve(city).await?;
        let forecast = self.provider.fetch(coordinates).await?;

        let current = normalize::current_reading(&forecast.current);
        let table = normalize::hourly_table(&forecast.hourly)?;
        debug!("Normalized {} hourly rows", table.len());

        let hours = HourWindow::anchored_at(now);
        let window = hours.forecast_window(&table);
        if window.is_empty() {
            warn!(
                "No hourly rows fall on the hour between {} and {}",
                hours.start, hours.end
            );
        }

        info!("Weather for '{}': {} hourly rows", city, window.len());
        Ok(WeatherResult::new(city.as_str(), current, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use crate::weather::{
        CURRENT_VARIABLES, CurrentBlock, HOURLY_VARIABLES, HourlyBlock, ProviderForecast,
        VariableSet,
    };
    use async_trait::async_trait;
    use chrono::{TimeDelta, TimeZone};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGeocoder(Option<Coordinates>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn resolve(&self, city: &CityQuery) -> Result<Coordinates> {
            self.0.ok_or_else(|| WeatherError::no_match(city.as_str()))
        }
    }

    struct GridProvider {
        start: DateTime<Utc>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ForecastProvider for GridProvider {
        async fn fetch(&self, _coordinates: Coordinates) -> Result<ProviderForecast> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let hours = 24;
            Ok(ProviderForecast {
                current: CurrentBlock {
                    time: self.start,
                    values: VariableSet::new(&CURRENT_VARIABLES, vec![json!(21.04); 6])?,
                },
                hourly: HourlyBlock {
                    start: self.start,
                    end: self.start + TimeDelta::hours(hours),
                    interval: TimeDelta::hours(1),
                    columns: VariableSet::new(
                        &HOURLY_VARIABLES,
                        vec![vec![Some(20.6); hours as usize]; 6],
                    )?,
                },
            })
        }
    }

    fn service(
        coordinates: Option<Coordinates>,
        grid_start: DateTime<Utc>,
    ) -> (WeatherService, Arc<GridProvider>) {
        let provider = Arc::new(GridProvider {
            start: grid_start,
            calls: AtomicUsize::new(0),
        });
        let service = WeatherService::new(Arc::new(FixedGeocoder(coordinates)), provider.clone());
        (service, provider)
    }

    #[tokio::test]
    async fn test_lookup_assembles_result() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let (service, _) = service(Some(Coordinates::new(35.6895, 139.6917)), start);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 41, 0).unwrap();

        let result = service
            .lookup_at(&CityQuery::parse("Tokyo").unwrap(), now)
            .await
            .unwrap();

        assert_eq!(result.city, "Tokyo");
        assert_eq!(result.current.get("temperature_2m"), Some(21.0));
        assert_eq!(result.hourly.len(), 7);
        assert_eq!(result.hourly.entries[0].row.temperature_2m, Some(21));
    }

    #[tokio::test]
    async fn test_no_match_skips_forecast() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let (service, provider) = service(None, start);

        let err = service
            .lookup_at(&CityQuery::parse("Atlantis").unwrap(), start)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::NoMatch { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_offset_grid_gives_empty_window() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 30, 0).unwrap();
        let (service, _) = service(Some(Coordinates::new(0.0, 0.0)), start);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 41, 0).unwrap();

        let result = service
            .lookup_at(&CityQuery::parse("Nowhere").unwrap(), now)
            .await
            .unwrap();
        assert!(result.hourly.is_empty());
    }
}
