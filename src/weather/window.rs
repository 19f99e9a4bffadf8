//! Six-hour display window anchored at the current hour.
//!
//! Rows are kept only when their timestamp equals one of the window's hour
//! boundaries exactly. A provider grid that is offset from the hour (say,
//! every hour at :30) therefore selects nothing.

use std::collections::HashSet;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use crate::models::{ForecastWindow, HourlyRow, WindowEntry};

pub const WINDOW_HOURS: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl HourWindow {
    /// Window starting at `now` truncated down to the hour
    #[must_use]
    pub fn anchored_at(now: DateTime<Utc>) -> Self {
        // only fails outside chrono's representable range
        let start = now.duration_trunc(TimeDelta::hours(1)).unwrap_or(now);
        Self {
            start,
            end: start + TimeDelta::hours(WINDOW_HOURS),
        }
    }

    /// Hour boundaries from start to end inclusive
    #[must_use]
    pub fn candidates(&self) -> Vec<DateTime<Utc>> {
        let mut points = Vec::new();
        let mut t = self.start;
        while t <= self.end {
            points.push(t);
            t += TimeDelta::hours(1);
        }
        points
    }

    /// Rows whose timestamp is one of the candidates, ascending by time
    #[must_use]
    pub fn select(&self, rows: &[HourlyRow]) -> Vec<HourlyRow> {
        let candidates: HashSet<DateTime<Utc>> = self.candidates().into_iter().collect();
        let mut selected: Vec<HourlyRow> = rows
            .iter()
            .filter(|row| candidates.contains(&row.timestamp))
            .cloned()
            .collect();
        selected.sort_by_key(|row| row.timestamp);
        selected
    }

    /// Selects and labels rows for display
    #[must_use]
    pub fn forecast_window(&self, rows: &[HourlyRow]) -> ForecastWindow {
        ForecastWindow {
            entries: self
                .select(rows)
                .into_iter()
                .map(|row| WindowEntry {
                    label: label(row.timestamp),
                    row,
                })
                .collect(),
        }
    }
}

/// `HH:MM` in UTC
#[must_use]
pub fn label(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}
