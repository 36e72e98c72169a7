//! Distributed tracing support.
//!
//! # Responsibilities
//! - Create one span per request, tagged with its correlation id
//! - Resolve the collector endpoint from configuration
//! - Build the OpenTelemetry provider that ships finished spans there
//!
//! # Design Decisions
//! - Spans carry the route template, not the expanded path
//! - Handlers and store calls nest under the request span via `#[instrument]`
//! - `tracing` spans become OpenTelemetry spans through `tracing-opentelemetry`;
//!   export is OTLP over HTTP, batched off the request path

use std::fmt;
use std::sync::Arc;

use axum::extract::MatchedPath;
use axum::http::Request;
use opentelemetry_otlp::{ExporterBuildError, SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tower_http::trace::MakeSpan;
use tracing::Span;

use crate::config::TracingConfig;
use crate::http::request::RequestContext;

/// Instrumentation scope of every exported span.
pub const TRACER_NAME: &str = "ecommerce-service";

/// Where finished spans are shipped (`JAEGER_HOST`:`JAEGER_PORT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterEndpoint {
    pub host: String,
    pub port: u16,
}

impl From<&TracingConfig> for ExporterEndpoint {
    fn from(config: &TracingConfig) -> Self {
        Self {
            host: config.exporter_host.clone(),
            port: config.exporter_port,
        }
    }
}

impl ExporterEndpoint {
    /// OTLP/HTTP traces URL on the collector.
    pub fn traces_url(&self) -> String {
        format!("http://{}:{}/v1/traces", self.host, self.port)
    }
}

impl fmt::Display for ExporterEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Resource identifying this service on every exported span.
pub fn service_resource(config: &TracingConfig) -> Resource {
    Resource::builder()
        .with_service_name(config.service_name.clone())
        .build()
}

/// Provider that batches spans and posts them to the configured collector.
///
/// Nothing is sent until a span closes; an unreachable collector drops
/// batches without affecting requests.
pub fn otlp_provider(config: &TracingConfig) -> Result<SdkTracerProvider, ExporterBuildError> {
    let endpoint = ExporterEndpoint::from(config);
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint.traces_url())
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_resource(service_resource(config))
        .with_batch_exporter(exporter)
        .build())
}

/// Builds the `http_request` span for `TraceLayer`.
#[derive(Debug, Clone)]
pub struct RequestSpan {
    service_name: Arc<str>,
}

impl RequestSpan {
    pub fn new(config: &TracingConfig) -> Self {
        Self {
            service_name: Arc::from(config.service_name.as_str()),
        }
    }
}

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .extensions()
            .get::<RequestContext>()
            .map(|ctx| ctx.request_id.to_string())
            .unwrap_or_default();
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(|path| path.as_str().to_owned())
            .unwrap_or_else(|| crate::http::pipeline::UNMATCHED_ENDPOINT.to_owned());

        tracing::info_span!(
            "http_request",
            service.name = %self.service_name,
            request_id = %request_id,
            method = %request.method(),
            route = %route,
        )
    }
}
