//! Forecast normalization: safe scalar extraction for current conditions and
//! reshaping of the hourly block into one row per timestamp.

use chrono::{DateTime, TimeDelta, Utc};

use super::{CurrentBlock, HourlyBlock};
use crate::models::{CurrentReading, HourlyRow};
use crate::{Result, WeatherError};

/// Value of the current variable at `index`, rounded to one decimal.
///
/// Non-numeric cells and indices outside the requested variables give `None`.
#[must_use]
pub fn get_value(current: &CurrentBlock, index: usize) -> Option<f64> {
    let number = current.values.by_index(index)?.as_f64()?;
    number.is_finite().then(|| round_one_decimal(number))
}

/// Every current variable, in request order
#[must_use]
pub fn current_reading(current: &CurrentBlock) -> CurrentReading {
    current
        .values
        .names()
        .enumerate()
        .map(|(index, name)| (name.to_string(), get_value(current, index)))
        .collect()
}

/// Half-open `[start, end)` sequence stepped by `interval`.
///
/// The span must be a whole number of steps, so the column always has
/// exactly `(end - start) / interval` entries.
pub fn timestamp_column(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: TimeDelta,
) -> Result<Vec<DateTime<Utc>>> {
    let step_ms = interval.num_milliseconds();
    if step_ms <= 0 {
        return Err(WeatherError::malformed(
            "forecast",
            format!("non-positive hourly interval {}s", interval.num_seconds()),
        ));
    }
    if end < start {
        return Err(WeatherError::malformed(
            "forecast",
            format!("hourly end {end} precedes start {start}"),
        ));
    }
    let span_ms = (end - start).num_milliseconds();
    if span_ms % step_ms != 0 {
        return Err(WeatherError::malformed(
            "forecast",
            format!(
                "hourly span {}s is not a multiple of the {}s interval",
                span_ms / 1000,
                step_ms / 1000
            ),
        ));
    }

    let mut column = Vec::new();
    let mut t = start;
    while t < end {
        column.push(t);
        t = t.checked_add_signed(interval).ok_or_else(|| {
            WeatherError::malformed("forecast", "hourly time axis out of range")
        })?;
    }
    Ok(column)
}

/// One row per generated timestamp, every cell rounded to a whole number
pub fn hourly_table(hourly: &HourlyBlock) -> Result<Vec<HourlyRow>> {
    let timestamps = timestamp_column(hourly.start, hourly.end, hourly.interval)?;

    for (name, column) in hourly.columns.iter() {
        if column.len() != timestamps.len() {
            return Err(WeatherError::shape(format!(
                "hourly '{name}' has {} values for {} timestamps",
                column.len(),
                timestamps.len()
            )));
        }
    }

    let column = |name: &str| -> Result<&[Option<f64>]> {
        hourly
            .columns
            .by_name(name)
            .map(Vec::as_slice)
            .ok_or_else(|| WeatherError::shape(format!("hourly block has no '{name}' column")))
    };
    let temperature = column("temperature_2m")?;
    let humidity = column("relative_humidity_2m")?;
    let precipitation_probability = column("precipitation_probability")?;
    let pressure = column("surface_pressure")?;
    let wind_speed = column("wind_speed_10m")?;
    let wind_gusts = column("wind_gusts_10m")?;

    Ok(timestamps
        .into_iter()
        .enumerate()
        .map(|(i, timestamp)| HourlyRow {
            timestamp,
            temperature_2m: round_whole(temperature[i]),
            relative_humidity_2m: round_whole(humidity[i]),
            precipitation_probability: round_whole(precipitation_probability[i]),
            surface_pressure: round_whole(pressure[i]),
            wind_speed_10m: round_whole(wind_speed[i]),
            wind_gusts_10m: round_whole(wind_gusts[i]),
        })
        .collect())
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

fn round_whole(value: Option<f64>) -> Option<i32> {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.round_ties_even() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{CURRENT_VARIABLES, HOURLY_VARIABLES, VariableSet};
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn current_block(values: Vec<Value>) -> CurrentBlock {
        CurrentBlock {
            time: Utc.with_ymd_and_hms(2024, 5, 1, 9, 45, 0).unwrap(),
            values: VariableSet::new(&CURRENT_VARIABLES, values).unwrap(),
        }
    }

    fn hourly_block(hours: i64, columns: Vec<Vec<Option<f64>>>) -> HourlyBlock {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        HourlyBlock {
            start,
            end: start + TimeDelta::hours(hours),
            interval: TimeDelta::hours(1),
            columns: VariableSet::new(&HOURLY_VARIABLES, columns).unwrap(),
        }
    }

    #[rstest]
    #[case(json!(18.34), Some(18.3))]
    #[case(json!(-2.06), Some(-2.1))]
    #[case(json!(61), Some(61.0))]
    #[case(json!(0.0), Some(0.0))]
    #[case(json!(null), None)]
    #[case(json!("12.5"), None)]
    #[case(json!([1.0]), None)]
    fn test_get_value_rounds_or_marks_absent(#[case] raw: Value, #[case] expected: Option<f64>) {
        let mut values = vec![json!(0.0); 6];
        values[0] = raw;
        assert_eq!(get_value(&current_block(values), 0), expected);
    }

    #[rstest]
    #[case(6)]
    #[case(7)]
    #[case(usize::MAX)]
    fn test_get_value_out_of_range_index_is_absent(#[case] index: usize) {
        let block = current_block(vec![json!(1.0); 6]);
        assert_eq!(get_value(&block, index), None);
    }

    #[test]
    fn test_current_reading_keeps_request_order() {
        let block = current_block(vec![
            json!(18.34),
            json!(61),
            json!(null),
            json!(1009.26),
            json!(12.1),
            json!(25.56),
        ]);
        let reading = current_reading(&block);

        let names: Vec<&str> = reading.iter().map(|r| r.variable.as_str()).collect();
        assert_eq!(names, CURRENT_VARIABLES.to_vec());
        assert_eq!(reading.get("surface_pressure"), Some(1009.3));
        assert_eq!(reading.get("precipitation"), None);
        assert_eq!(reading.get("wind_gusts_10m"), Some(25.6));
    }

    #[rstest]
    #[case(0, 3600, 0)]
    #[case(24 * 3600, 3600, 24)]
    #[case(7 * 24 * 3600, 3600, 168)]
    #[case(6 * 3600, 900, 24)]
    #[case(12 * 3600, 3 * 3600, 4)]
    fn test_timestamp_column_length_and_spacing(
        #[case] span_secs: i64,
        #[case] interval_secs: i64,
        #[case] expected_len: usize,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let interval = TimeDelta::seconds(interval_secs);
        let column =
            timestamp_column(start, start + TimeDelta::seconds(span_secs), interval).unwrap();

        assert_eq!(column.len(), expected_len);
        assert_eq!(column.len() as i64, span_secs / interval_secs);
        assert!(column.windows(2).all(|w| w[1] - w[0] == interval));
        if let Some(first) = column.first() {
            assert_eq!(*first, start);
        }
    }

    #[rstest]
    #[case(3600, 0)]
    #[case(-3600, 3600)]
    #[case(5400, 3600)]
    #[case(3601, 3600)]
    fn test_timestamp_column_rejects_bad_grid(#[case] span_secs: i64, #[case] interval_secs: i64) {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let err = timestamp_column(
            start,
            start + TimeDelta::seconds(span_secs),
            TimeDelta::seconds(interval_secs),
        )
        .unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse { .. }));
    }

    #[test]
    fn test_timestamp_column_up_to_max_instant() {
        let end = DateTime::<Utc>::MAX_UTC;
        let start = end - TimeDelta::hours(2);
        let column = timestamp_column(start, end, TimeDelta::hours(1)).unwrap();
        assert_eq!(column.len(), 2);
        assert_eq!(column[1], end - TimeDelta::hours(1));
    }

    #[test]
    fn test_hourly_table_rounds_to_whole_numbers() {
        let columns = vec![
            vec![Some(18.4), Some(18.6)],
            vec![Some(60.5), Some(61.5)],
            vec![None, Some(40.0)],
            vec![Some(1009.26), Some(1008.7)],
            vec![Some(12.1), Some(-0.4)],
            vec![Some(25.56), Some(30.0)],
        ];
        let table = hourly_table(&hourly_block(2, columns)).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].temperature_2m, Some(18));
        assert_eq!(table[1].temperature_2m, Some(19));
        assert_eq!(table[0].relative_humidity_2m, Some(60));
        assert_eq!(table[1].relative_humidity_2m, Some(62));
        assert_eq!(table[0].precipitation_probability, None);
        assert_eq!(table[0].surface_pressure, Some(1009));
        assert_eq!(table[1].wind_speed_10m, Some(0));
        assert_eq!(table[1].timestamp - table[0].timestamp, TimeDelta::hours(1));
    }

    #[test]
    fn test_hourly_table_length_mismatch_is_fatal() {
        let mut columns = vec![vec![Some(1.0); 3]; 6];
        columns[4].pop();
        let err = hourly_table(&hourly_block(3, columns)).unwrap_err();
        assert!(matches!(err, WeatherError::ShapeMismatch { .. }));
    }
}
