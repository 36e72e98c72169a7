//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request (via http::pipeline) produces:
//!     → logging.rs (one structured log line)
//!     → metrics.rs (request counter, latency histogram, error counter)
//!     → tracing.rs (span tagged with the correlation id)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → GET /metrics (Prometheus scrape)
//!     → Trace collector (OTLP/HTTP at JAEGER_HOST:JAEGER_PORT)
//! ```

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::metrics::MetricsRecorder;
pub use self::tracing::{ExporterEndpoint, RequestSpan};
