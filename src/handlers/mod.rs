//! Route handlers.
//!
//! Each handler is a thin translation between HTTP and store calls; the
//! pipeline around them owns logging and metrics.

pub mod orders;
pub mod products;
pub mod system;
pub mod types;

pub use types::{CheckoutRequest, CheckoutResponse, Order, Product};
