//! Forecast window and the assembled lookup result

use serde::{Deserialize, Serialize};

use super::{CurrentReading, HourlyRow};

/// An hourly row with its display label (`HH:MM`, UTC)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WindowEntry {
    pub label: String,
    #[serde(flatten)]
    pub row: HourlyRow,
}

/// Rows of the six-hour display window, ascending by time. May be empty.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ForecastWindow {
    pub entries: Vec<WindowEntry>,
}

impl ForecastWindow {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }
}

/// Everything the view needs for one successful lookup
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherResult {
    pub city: String,
    pub current: CurrentReading,
    pub hourly: ForecastWindow,
}

impl WeatherResult {
    #[must_use]
    pub fn new(city: impl Into<String>, current: CurrentReading, hourly: ForecastWindow) -> Self {
        Self {
            city: city.into(),
            current,
            hourly,
        }
    }
}
