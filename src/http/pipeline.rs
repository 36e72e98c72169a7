//! Request pipeline.
//!
//! # Responsibilities
//! - Assign the correlation id and start time before routing reaches a handler
//! - Record request count, latency and errors once the response exists
//! - Emit exactly one structured log line per request
//!
//! # Design Decisions
//! - Runs outside the panic catcher, so failed handlers are still observed
//! - Endpoint label is the matched route template; unmatched paths share
//!   a single label to keep metric cardinality bounded

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::http::request::{RequestContext, X_REQUEST_ID};
use crate::observability::MetricsRecorder;

/// Endpoint label for requests that matched no route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Observe every request: context, metrics, access log.
pub async fn observe_request(
    State(metrics): State<MetricsRecorder>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::start();
    let method = request.method().clone();
    let endpoint = endpoint_label(&request);
    let url = full_url(&request);

    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;

    let elapsed = ctx.started_at.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    metrics.record_request(method.as_str(), &endpoint, status, elapsed);

    tracing::info!(
        request_id = %ctx.request_id,
        method = %method,
        url = %url,
        status_code = status,
        response_time = %format_elapsed(elapsed),
        "request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&ctx.request_id.to_string()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    response
}

fn endpoint_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_owned())
}

/// Reconstruct the absolute URL the client asked for.
fn full_url(request: &Request) -> String {
    let uri = request.uri();
    if uri.scheme().is_some() {
        return uri.to_string();
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    format!("http://{host}{path}")
}

/// Seconds with four decimals and a unit suffix, e.g. `0.0123s`.
pub fn format_elapsed(secs: f64) -> String {
    format!("{secs:.4}s")
}
