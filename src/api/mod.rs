use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::models::{CityQuery, WeatherResult};
use crate::web::AppState;
use crate::{VERSION, WeatherError};

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

impl From<&WeatherError> for ApiError {
    fn from(err: &WeatherError) -> Self {
        Self {
            error: err.code().to_string(),
            message: err.user_message(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
}

pub fn router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/weather", get(get_weather))
        .route("/health", get(get_health))
        .layer(cors)
}

async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<WeatherResult>, (StatusCode, Json<ApiError>)> {
    let city = CityQuery::parse(&params.city).map_err(reject)?;
    let result = state.service.lookup(&city).await.map_err(|e| {
        tracing::warn!("API lookup for '{}' failed: {}", city, e);
        reject(e)
    })?;
    Ok(Json(result))
}

async fn get_health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: VERSION.to_string(),
    })
}

fn reject(err: WeatherError) -> (StatusCode, Json<ApiError>) {
    (err.status_code(), Json(ApiError::from(&err)))
}
