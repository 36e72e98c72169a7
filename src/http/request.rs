//! Per-request context.
//!
//! # Responsibilities
//! - Generate the correlation id (UUID v4) for each request
//! - Carry it, with the start instant, in request extensions
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Handlers read it explicitly with `Extension<RequestContext>`
//! - Never persisted; echoed to the caller in `x-request-id`

use std::fmt;
use std::time::Instant;

use axum::http::HeaderName;
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Opaque correlation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Request-scoped values set by the pipeline before any handler runs.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub started_at: Instant,
}

impl RequestContext {
    pub fn start() -> Self {
        Self {
            request_id: RequestId::new(),
            started_at: Instant::now(),
        }
    }
}
