use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::http::response::ApiError;
use crate::http::server::AppState;

/// Detail returned by `GET /error`.
pub const SIMULATED_ERROR: &str = "Simulated application error";

/// Content type of the Prometheus text format.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn root() -> Json<Value> {
    Json(json!({"Hello": "World"}))
}

/// Always fails. Exercises the error metrics and logging path.
pub async fn simulate_error() -> Result<Json<Value>, ApiError> {
    Err(ApiError::Internal(SIMULATED_ERROR.to_string()))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
