//! Error types and handling for the `CityWeather` application

use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for a city weather lookup
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The submitted city name failed form validation
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The geocoder returned an empty result set
    #[error("No location found for '{city}'")]
    NoMatch { city: String },

    /// Transport or HTTP failure talking to an upstream service
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable {
        service: &'static str,
        message: String,
    },

    /// Upstream payload did not have the expected shape
    #[error("Malformed {service} response: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },

    /// Hourly columns disagree with the generated time axis or the requested variables
    #[error("Forecast shape mismatch: {message}")]
    ShapeMismatch { message: String },

    /// The provider rejected the request and said why
    #[error("{service} rejected the request: {reason}")]
    Provider {
        service: &'static str,
        reason: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn no_match<S: Into<String>>(city: S) -> Self {
        Self::NoMatch { city: city.into() }
    }

    pub fn upstream<S: Into<String>>(service: &'static str, message: S) -> Self {
        Self::UpstreamUnavailable {
            service,
            message: message.into(),
        }
    }

    pub fn malformed<S: Into<String>>(service: &'static str, message: S) -> Self {
        Self::MalformedResponse {
            service,
            message: message.into(),
        }
    }

    pub fn shape<S: Into<String>>(message: S) -> Self {
        Self::ShapeMismatch {
            message: message.into(),
        }
    }

    pub fn provider<S: Into<String>>(service: &'static str, reason: S) -> Self {
        Self::Provider {
            service,
            reason: reason.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Stable machine-readable code, used by the JSON API
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            WeatherError::Validation { .. } => "validation",
            WeatherError::NoMatch { .. } => "no_match",
            WeatherError::UpstreamUnavailable { .. } => "upstream_unavailable",
            WeatherError::MalformedResponse { .. } => "malformed_response",
            WeatherError::ShapeMismatch { .. } => "shape_mismatch",
            WeatherError::Provider { .. } => "provider",
            WeatherError::Config { .. } => "config",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::Validation { message } => message.clone(),
            WeatherError::NoMatch { city } => {
                format!("We couldn't find a city called '{city}'. Please check the spelling.")
            }
            WeatherError::UpstreamUnavailable { .. } => {
                "The weather service is not responding right now. Please try again.".to_string()
            }
            WeatherError::MalformedResponse { .. } | WeatherError::ShapeMismatch { .. } => {
                "The weather service sent data we could not read. Please try again later."
                    .to_string()
            }
            WeatherError::Provider { reason, .. } => {
                format!("The weather service rejected the request: {reason}")
            }
            WeatherError::Config { .. } => {
                "The application is misconfigured. Please contact the administrator.".to_string()
            }
        }
    }

    /// HTTP status for this error at the request boundary
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            WeatherError::Validation { .. } | WeatherError::Provider { .. } => {
                StatusCode::BAD_REQUEST
            }
            WeatherError::NoMatch { .. } => StatusCode::NOT_FOUND,
            WeatherError::UpstreamUnavailable { .. }
            | WeatherError::MalformedResponse { .. }
            | WeatherError::ShapeMismatch { .. } => StatusCode::BAD_GATEWAY,
            WeatherError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WeatherError::no_match("Atlantis");
        assert!(matches!(err, WeatherError::NoMatch { .. }));

        let err = WeatherError::upstream("geocoding", "connection refused");
        assert!(matches!(
            err,
            WeatherError::UpstreamUnavailable {
                service: "geocoding",
                ..
            }
        ));

        let err = WeatherError::shape("3 != 24");
        assert!(matches!(err, WeatherError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_user_messages() {
        assert!(
            WeatherError::no_match("Atlantis")
                .user_message()
                .contains("Atlantis")
        );
        assert!(
            WeatherError::upstream("forecast", "timeout")
                .user_message()
                .contains("try again")
        );
        assert_eq!(
            WeatherError::validation("bad city").user_message(),
            "bad city"
        );
    }

    #[test]
    fn test_provider_reason_is_preserved() {
        let err = WeatherError::provider("forecast", "Latitude must be in range of -90 to 90°.");
        assert_eq!(
            err.to_string(),
            "forecast rejected the request: Latitude must be in range of -90 to 90°."
        );
        assert_eq!(err.code(), "provider");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WeatherError::no_match("Atlantis").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WeatherError::shape("3 != 24").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            WeatherError::config("missing key").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
