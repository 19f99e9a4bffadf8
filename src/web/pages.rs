//! Handlers for the HTML index page

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use tracing::{error, info, warn};

use super::AppState;
use super::form::{CityForm, CityInput};
use super::view::render_page;
use crate::WeatherError;

pub async fn index() -> Html<String> {
    Html(render_page(&CityForm::new(), None, None))
}

pub async fn submit(
    State(state): State<AppState>,
    Form(input): Form<CityInput>,
) -> (StatusCode, Html<String>) {
    let (form, city) = CityForm::bind(&input);
    let Some(city) = city else {
        info!("Rejected city input: {:?}", form.errors);
        return (StatusCode::OK, Html(render_page(&form, None, None)));
    };

    match state.service.lookup(&city).await {
        Ok(result) => (StatusCode::OK, Html(render_page(&form, Some(&result), None))),
        Err(e) => {
            match &e {
                WeatherError::NoMatch { .. } | WeatherError::Provider { .. } => {
                    warn!("Lookup for '{}' failed: {}", city, e);
                }
                _ => error!("Lookup for '{}' failed: {}", city, e),
            }
            // keep the form editable so the user can correct the name
            let form = CityForm {
                disabled: false,
                ..form
            };
            (
                e.status_code(),
                Html(render_page(&form, None, Some(&e.user_message()))),
            )
        }
    }
}
