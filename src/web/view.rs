//! HTML rendering of the index page

use std::fmt::Write;

use super::form::{CityForm, HELP_TEXT, PLACEHOLDER};
use crate::models::{HourlyRow, WeatherResult};
use crate::weather::HOURLY_VARIABLES;

/// Display name and unit of a forecast variable
#[must_use]
pub fn variable_label(variable: &str) -> (&'static str, &'static str) {
    match variable {
        "temperature_2m" => ("Temperature", "°C"),
        "relative_humidity_2m" => ("Humidity", "%"),
        "precipitation" => ("Precipitation", "mm"),
        "precipitation_probability" => ("Precipitation probability", "%"),
        "surface_pressure" => ("Pressure", "hPa"),
        "wind_speed_10m" => ("Wind speed", "km/h"),
        "wind_gusts_10m" => ("Wind gusts", "km/h"),
        _ => ("Unknown", ""),
    }
}

fn hourly_cell(row: &HourlyRow, variable: &str) -> Option<i32> {
    match variable {
        "temperature_2m" => row.temperature_2m,
        "relative_humidity_2m" => row.relative_humidity_2m,
        "precipitation_probability" => row.precipitation_probability,
        "surface_pressure" => row.surface_pressure,
        "wind_speed_10m" => row.wind_speed_10m,
        "wind_gusts_10m" => row.wind_gusts_10m,
        _ => None,
    }
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Whole page: the form, then either the result or an error banner
#[must_use]
pub fn render_page(form: &CityForm, result: Option<&WeatherResult>, error: Option<&str>) -> String {
    let mut body = render_form(form);
    if let Some(message) = error {
        let _ = write!(body, r#"<div class="error-banner">{}</div>"#, escape(message));
    }
    if let Some(result) = result {
        body.push_str(&render_result(result));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>City weather</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<main>
<h1>City weather</h1>
{body}
</main>
</body>
</html>
"#
    )
}

fn render_form(form: &CityForm) -> String {
    let mut html = String::from(r#"<form method="post" action="/" class="city-form">"#);
    let _ = write!(
        html,
        r#"<input type="text" name="city" id="id_city" value="{}" placeholder="{}" maxlength="{}" required{}>"#,
        escape(&form.value),
        PLACEHOLDER,
        form.max_length(),
        if form.disabled { " disabled" } else { "" }
    );
    let _ = write!(html, r#"<span class="helptext">{HELP_TEXT}</span>"#);
    if !form.errors.is_empty() {
        html.push_str(r#"<ul class="errorlist">"#);
        for error in &form.errors {
            let _ = write!(html, "<li>{}</li>", escape(error));
        }
        html.push_str("</ul>");
    }
    if form.disabled {
        html.push_str(r#"<a href="/" class="button">Search again</a>"#);
    } else {
        html.push_str(r#"<button type="submit">Show weather</button>"#);
    }
    html.push_str("</form>");
    html
}

fn render_result(result: &WeatherResult) -> String {
    let mut html = format!(
        r#"<section class="current"><h2>Weather in {}</h2><table>"#,
        escape(&result.city)
    );
    for reading in result.current.iter() {
        let (name, unit) = variable_label(&reading.variable);
        let value = reading
            .value
            .map_or_else(|| "n/a".to_string(), |v| format!("{v:.1} {unit}"));
        let _ = write!(html, "<tr><th>{name}</th><td>{value}</td></tr>");
    }
    html.push_str("</table></section>");

    html.push_str(r#"<section class="hourly"><h2>Next hours (UTC)</h2>"#);
    if result.hourly.is_empty() {
        html.push_str(r#"<p class="empty">No hourly forecast available for this period.</p>"#);
    } else {
        html.push_str("<table><thead><tr><th>Time</th>");
        for variable in HOURLY_VARIABLES {
            let (name, unit) = variable_label(variable);
            let _ = write!(html, "<th>{name} ({unit})</th>");
        }
        html.push_str("</tr></thead><tbody>");
        for entry in &result.hourly.entries {
            let _ = write!(html, "<tr><td>{}</td>", entry.label);
            for variable in HOURLY_VARIABLES {
                match hourly_cell(&entry.row, variable) {
                    Some(value) => {
                        let _ = write!(html, "<td>{value}</td>");
                    }
                    None => html.push_str("<td>n/a</td>"),
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
    }
    html.push_str("</section>");
    html
}
