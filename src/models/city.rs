//! Validated city name submitted by the user

use std::fmt;

use serde::Serialize;

use crate::{Result, WeatherError};

pub const MAX_CITY_LENGTH: usize = 100;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const PATTERN_MESSAGE: &str =
    "What is this? Let's try to enter the city name using English letters.";

/// A city name of 1 to 100 characters made of ASCII letters and whitespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityQuery(String);

impl CityQuery {
    /// Trims surrounding whitespace, then validates.
    pub fn parse(input: &str) -> Result<Self> {
        let city = input.trim();

        if city.is_empty() {
            return Err(WeatherError::validation(REQUIRED_MESSAGE));
        }

        let length = city.chars().count();
        if length > MAX_CITY_LENGTH {
            return Err(WeatherError::validation(format!(
                "Ensure this value has at most {MAX_CITY_LENGTH} characters (it has {length})."
            )));
        }

        if !city
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        {
            return Err(WeatherError::validation(PATTERN_MESSAGE));
        }

        Ok(Self(city.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
