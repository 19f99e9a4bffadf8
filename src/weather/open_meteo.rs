//! `OpenMeteo` API response structures and conversion to [`ProviderForecast`]

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{CurrentBlock, HourlyBlock, ProviderForecast, VariableSet};
use crate::{Result, WeatherError};

const SERVICE: &str = "forecast";

/// Open-Meteo's hourly models always step by one hour; used when a block has a single point
const DEFAULT_HOURLY_INTERVAL_SECS: i64 = 3600;

/// Forecast response from `OpenMeteo` API. Blocks are kept as maps so the
/// requested variable names can be checked against what came back.
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    pub current: Option<Map<String, Value>>,
    pub hourly: Option<Map<String, Value>>,
}

impl ForecastResponse {
    pub fn into_provider_forecast(
        self,
        current_variables: &[&'static str],
        hourly_variables: &[&'static str],
    ) -> Result<ProviderForecast> {
        let current = self
            .current
            .ok_or_else(|| WeatherError::malformed(SERVICE, "response has no 'current' block"))?;
        let hourly = self
            .hourly
            .ok_or_else(|| WeatherError::malformed(SERVICE, "response has no 'hourly' block"))?;

        Ok(ProviderForecast {
            current: parse_current(current, current_variables)?,
            hourly: parse_hourly(hourly, hourly_variables)?,
        })
    }
}

fn parse_current(mut block: Map<String, Value>, variables: &[&'static str]) -> Result<CurrentBlock> {
    let time = block
        .get("time")
        .ok_or_else(|| WeatherError::malformed(SERVICE, "'current' block has no 'time'"))
        .and_then(parse_instant)?;

    let values = variables
        .iter()
        .map(|name| {
            block
                .remove(*name)
                .ok_or_else(|| WeatherError::shape(format!("'current' block is missing '{name}'")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CurrentBlock {
        time,
        values: VariableSet::new(variables, values)?,
    })
}

fn parse_hourly(block: Map<String, Value>, variables: &[&'static str]) -> Result<HourlyBlock> {
    let times = match block.get("time") {
        Some(Value::Array(items)) => items.iter().map(parse_instant).collect::<Result<Vec<_>>>()?,
        _ => {
            return Err(WeatherError::malformed(
                SERVICE,
                "'hourly' block has no 'time' array",
            ));
        }
    };
    let (start, end, interval) = grid_of(&times)?;

    let columns = variables
        .iter()
        .map(|name| match block.get(*name) {
            Some(Value::Array(cells)) => cells
                .iter()
                .map(|cell| parse_cell(name, cell))
                .collect::<Result<Vec<_>>>(),
            Some(_) => Err(WeatherError::malformed(
                SERVICE,
                format!("hourly '{name}' is not an array"),
            )),
            None => Err(WeatherError::shape(format!(
                "'hourly' block is missing '{name}'"
            ))),
        })
        .collect::<Result<Vec<Vec<Option<f64>>>>>()?;

    Ok(HourlyBlock {
        start,
        end,
        interval,
        columns: VariableSet::new(variables, columns)?,
    })
}

fn parse_cell(name: &str, cell: &Value) -> Result<Option<f64>> {
    match cell {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        other => Err(WeatherError::malformed(
            SERVICE,
            format!("hourly '{name}' has non-numeric cell {other}"),
        )),
    }
}

/// Start, exclusive end and step of a regular time axis
fn grid_of(times: &[DateTime<Utc>]) -> Result<(DateTime<Utc>, DateTime<Utc>, TimeDelta)> {
    let Some(&start) = times.first() else {
        return Err(WeatherError::malformed(SERVICE, "hourly time axis is empty"));
    };

    let interval = match times.get(1) {
        Some(&second) => second - start,
        None => TimeDelta::seconds(DEFAULT_HOURLY_INTERVAL_SECS),
    };
    if interval <= TimeDelta::zero() {
        return Err(WeatherError::malformed(
            SERVICE,
            "hourly time axis is not increasing",
        ));
    }

    let mut expected = start;
    for &time in times {
        if time != expected {
            return Err(WeatherError::malformed(
                SERVICE,
                format!("irregular hourly time axis at {time}"),
            ));
        }
        expected = expected
            .checked_add_signed(interval)
            .ok_or_else(|| WeatherError::malformed(SERVICE, "hourly time axis out of range"))?;
    }

    Ok((start, expected, interval))
}

/// Unix seconds, or RFC 3339 text with an explicit offset. Naive text is rejected.
fn parse_instant(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| WeatherError::malformed(SERVICE, format!("invalid unix time {n}"))),
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| {
                WeatherError::malformed(
                    SERVICE,
                    format!("timestamp '{text}' is not UTC-aware"),
                )
            }),
        other => Err(WeatherError::malformed(
            SERVICE,
            format!("unexpected timestamp {other}"),
        )),
    }
}
