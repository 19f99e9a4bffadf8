//! Coordinate resolution
//!
//! Turns a validated city name into a single latitude/longitude pair using
//! the OpenCage forward geocoding API. When the name is ambiguous the first
//! (best ranked) candidate is used.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::http::HttpFetcher;
use crate::models::{CityQuery, Coordinates};
use crate::{Result, WeatherError};

/// Resolves a city name to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, city: &CityQuery) -> Result<Coordinates>;
}

/// OpenCage `/json` response. Only the first result is ever inspected.
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    lat: f64,
    lng: f64,
}

pub struct OpenCageGeocoder {
    http: HttpFetcher,
    base_url: String,
    api_key: String,
}

impl OpenCageGeocoder {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn search_url(&self, city: &CityQuery) -> Result<Url> {
        let endpoint = format!("{}/json", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(
            &endpoint,
            &[
                ("q", city.as_str()),
                ("key", self.api_key.as_str()),
                ("limit", "1"),
                ("no_annotations", "1"),
            ],
        )
        .map_err(|e| WeatherError::config(format!("Invalid geocoding base URL '{endpoint}': {e}")))
    }
}

#[async_trait]
impl Geocoder for OpenCageGeocoder {
    #[instrument(skip(self), fields(city = %city))]
    async fn resolve(&self, city: &CityQuery) -> Result<Coordinates> {
        debug!("Geocoding location name: {}", city);
        let url = self.search_url(city)?;

        let response: GeocodingResponse = self.http.get_json(&url).await?;
        let Some(first) = response.results.into_iter().next() else {
            info!("No geocoding results for '{}'", city);
            return Err(WeatherError::no_match(city.as_str()));
        };

        let candidate: Candidate = serde_json::from_value(first).map_err(|e| {
            WeatherError::malformed(
                self.http.service(),
                format!("first result has no usable geometry: {e}"),
            )
        })?;

        let coordinates = Coordinates::new(candidate.geometry.lat, candidate.geometry.lng);
        info!(
            "Resolved '{}' to {}",
            city,
            coordinates.format_coordinates()
        );
        Ok(coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(server: &MockServer) -> OpenCageGeocoder {
        let http = HttpFetcher::new("geocoding", Duration::from_secs(5), 0, None).unwrap();
        OpenCageGeocoder::new(http, server.uri(), "test-api-key")
    }

    fn city(name: &str) -> CityQuery {
        CityQuery::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_resolves_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .and(query_param("q", "Springfield"))
            .and(query_param("key", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"formatted": "Springfield, IL", "geometry": {"lat": 39.7817, "lng": -89.6501}},
                    {"formatted": "Springfield, MA", "geometry": {"lat": 42.1015, "lng": -72.5898}}
                ],
                "total_results": 2
            })))
            .mount(&server)
            .await;

        let coordinates = geocoder(&server)
            .resolve(&city("Springfield"))
            .await
            .unwrap();
        assert_eq!(coordinates, Coordinates::new(39.7817, -89.6501));
    }

    #[tokio::test]
    async fn test_empty_results_is_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"results": [], "total_results": 0})),
            )
            .mount(&server)
            .await;

        let err = geocoder(&server)
            .resolve(&city("Atlantis"))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::NoMatch { ref city } if city == "Atlantis"));
    }

    #[tokio::test]
    async fn test_missing_geometry_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"formatted": "Tokyo", "geometry": {"lat": "35.68"}}]
            })))
            .mount(&server)
            .await;

        let err = geocoder(&server).resolve(&city("Tokyo")).await.unwrap_err();
        assert!(matches!(
            err,
            WeatherError::MalformedResponse {
                service: "geocoding",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_results_key_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": {"code": 200}})))
            .mount(&server)
            .await;

        let err = geocoder(&server).resolve(&city("Tokyo")).await.unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_http_failure_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = geocoder(&server).resolve(&city("Tokyo")).await.unwrap_err();
        assert!(matches!(err, WeatherError::UpstreamUnavailable { .. }));
    }
}
