//! Current readings and hourly forecast rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One current variable and its rounded value; `None` marks an absent value
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reading {
    pub variable: String,
    pub value: Option<f64>,
}

/// Current conditions in the order the variables were requested
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CurrentReading {
    pub readings: Vec<Reading>,
}

impl CurrentReading {
    /// Value of `variable`, `None` if unknown or absent
    #[must_use]
    pub fn get(&self, variable: &str) -> Option<f64> {
        self.readings
            .iter()
            .find(|r| r.variable == variable)
            .and_then(|r| r.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }
}

impl FromIterator<(String, Option<f64>)> for CurrentReading {
    fn from_iter<I: IntoIterator<Item = (String, Option<f64>)>>(iter: I) -> Self {
        Self {
            readings: iter
                .into_iter()
                .map(|(variable, value)| Reading { variable, value })
                .collect(),
        }
    }
}

/// One hour of the normalized forecast table. Values are rounded to whole numbers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyRow {
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature_2m: Option<i32>,
    /// Relative humidity in percent
    pub relative_humidity_2m: Option<i32>,
    /// Precipitation probability in percent
    pub precipitation_probability: Option<i32>,
    /// Surface pressure in hPa
    pub surface_pressure: Option<i32>,
    /// Wind speed in km/h
    pub wind_speed_10m: Option<i32>,
    /// Wind gusts in km/h
    pub wind_gusts_10m: Option<i32>,
}
