use axum::{extract::State, Json};
use tracing::instrument;

use crate::handlers::types::{project, Product};
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// `GET /products`: every product, in store order.
#[instrument(skip_all)]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let rows = state.store.query("SELECT * FROM products", vec![]).await?;
    Ok(Json(project(rows)?))
}
