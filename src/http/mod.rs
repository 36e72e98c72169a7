//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → pipeline.rs (correlation id, timing)
//!     → [route table picks handler]
//!     → handler → Response or ApiError (response.rs)
//!     → pipeline.rs (metrics, access log, x-request-id)
//!     → Send to client
//! ```

pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, RequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
