//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::http::response::ApiError;
use crate::store::Row;

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
}

/// A placed order. `total` is frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub total: f64,
}

/// Checkout input. Both fields are optional at the wire level so that a
/// missing field is reported as a 400 rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: i64,
    pub total: f64,
}

/// Project store rows into typed records by column name.
pub fn project<T>(rows: Vec<Row>) -> Result<Vec<T>, ApiError>
where
    T: serde::de::DeserializeOwned,
{
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(serde_json::Value::Object(row))
                .map_err(|e| ApiError::Internal(format!("Malformed row: {e}")))
        })
        .collect()
}
