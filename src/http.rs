//! Shared upstream transport: retrying HTTP client with an optional response cache.

use std::time::{Duration, Instant};

use reqwest::Url;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::cache::ResponseCache;
use crate::{Result, WeatherError};

const USER_AGENT: &str = concat!("CityWeather/", env!("CARGO_PKG_VERSION"));

/// Body shape Open-Meteo uses to explain a rejected request
#[derive(Debug, Deserialize)]
struct ProviderRejection {
    reason: String,
}

/// Performs GET requests against one upstream service and decodes JSON bodies
#[derive(Clone)]
pub struct HttpFetcher {
    service: &'static str,
    client: ClientWithMiddleware,
    cache: Option<ResponseCache>,
}

impl HttpFetcher {
    pub fn new(
        service: &'static str,
        timeout: Duration,
        max_retries: u32,
        cache: Option<ResponseCache>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            service,
            client,
            cache,
        })
    }

    #[must_use]
    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Fetches `url` and decodes the body as `T`.
    ///
    /// Cache hits skip the network entirely. Undecodable bodies are
    /// `MalformedResponse`; transport errors and non-success statuses are
    /// `UpstreamUnavailable`, except 4xx bodies carrying a provider `reason`.
    #[instrument(skip(self, url), fields(service = self.service, url = %redact(url)))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let body = self.get_bytes(url).await?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!("Failed to decode {} response: {}", self.service, e);
            WeatherError::malformed(self.service, e.to_string())
        })
    }

    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        // keyed without credentials so API keys never reach the disk
        let cache_key = redact(url);
        if let Some(cache) = &self.cache {
            match cache.get(&cache_key).await {
                Ok(Some(body)) => {
                    debug!("Serving {} response from cache", self.service);
                    return Ok(body);
                }
                Ok(None) => {}
                Err(e) => warn!("Cache lookup failed, falling through to network: {}", e),
            }
        }

        let start_time = Instant::now();
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!("Network error calling {}: {}", self.service, e);
            WeatherError::upstream(self.service, e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| WeatherError::upstream(self.service, e.to_string()))?
            .to_vec();

        if !status.is_success() {
            if status.is_client_error() {
                if let Ok(rejection) = serde_json::from_slice::<ProviderRejection>(&body) {
                    warn!("{} rejected request ({}): {}", self.service, status, rejection.reason);
                    return Err(WeatherError::provider(self.service, rejection.reason));
                }
            }
            warn!("{} returned HTTP {}", self.service, status);
            return Err(WeatherError::upstream(
                self.service,
                format!(
                    "HTTP {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
            ));
        }

        info!(
            "{} responded {} in {:.3}s",
            self.service,
            status,
            start_time.elapsed().as_secs_f64()
        );

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&cache_key, body.clone()).await {
                warn!("Failed to cache {} response: {}", self.service, e);
            }
        }

        Ok(body)
    }
}

/// URL with credential-like query parameters masked, for logs
pub(crate) fn redact(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" || k == "apikey" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted.to_string()
}
