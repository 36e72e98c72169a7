use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::Value;
use tracing::instrument;

use crate::handlers::types::{project, CheckoutRequest, CheckoutResponse, Order};
use crate::http::request::RequestContext;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::store::SqlValue;

const MISSING_FIELDS: &str = "product_id and quantity are required";
const BAD_QUANTITY: &str = "quantity must be a positive integer";
const PRODUCT_NOT_FOUND: &str = "Product not found";

/// `POST /checkout`: price lookup, total, order insert.
///
/// Nothing is written unless the lookup succeeded, so a failed checkout
/// never leaves an order behind. Retried calls create duplicate orders.
#[instrument(skip_all, fields(request_id = %ctx.request_id))]
pub async fn checkout(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let Json(order) = payload?;

    // Zero counts as absent for both fields.
    let (product_id, quantity) = match (order.product_id, order.quantity) {
        (Some(product_id), Some(quantity)) if product_id != 0 && quantity != 0 => {
            (product_id, quantity)
        }
        _ => return Err(ApiError::BadRequest(MISSING_FIELDS.to_string())),
    };
    if quantity < 0 {
        return Err(ApiError::BadRequest(BAD_QUANTITY.to_string()));
    }

    let rows = state
        .store
        .query(
            "SELECT price FROM products WHERE id = ?",
            vec![SqlValue::Integer(product_id)],
        )
        .await?;
    let row = rows
        .first()
        .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;
    let price = row
        .get("price")
        .and_then(Value::as_f64)
        .ok_or_else(|| ApiError::Internal(format!("Product {product_id} has no price")))?;

    // Plain f64 arithmetic, no rounding.
    let total = price * quantity as f64;

    let inserted = state
        .store
        .execute(
            "INSERT INTO orders (product_id, quantity, total) VALUES (?, ?, ?)",
            vec![
                SqlValue::Integer(product_id),
                SqlValue::Integer(quantity),
                SqlValue::Real(total),
            ],
        )
        .await?;

    tracing::info!(
        request_id = %ctx.request_id,
        order_id = inserted.last_insert_id,
        product_id,
        quantity,
        total,
        "Order created"
    );

    Ok(Json(CheckoutResponse {
        order_id: inserted.last_insert_id,
        total,
    }))
}

/// `GET /orders`: every order, in store order.
#[instrument(skip_all)]
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    let rows = state.store.query("SELECT * FROM orders", vec![]).await?;
    Ok(Json(project(rows)?))
}
