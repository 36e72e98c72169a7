//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, endpoint, status_code
//! - `http_request_duration_seconds` (histogram): latency by method, endpoint
//! - `http_errors_total` (counter): requests with status >= 400
//!
//! # Design Decisions
//! - The recorder is an owned service handed to the pipeline, not the
//!   process-global `metrics` recorder, so tests get isolated registries
//! - Updates are atomic inside the Prometheus registry; rendering takes a
//!   snapshot and never blocks recording
//! - Endpoint labels are route templates, never expanded paths

use std::fmt::Write as _;
use std::sync::Arc;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const ERRORS_TOTAL: &str = "http_errors_total";

/// Latency buckets in seconds, tuned for typical web latencies.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

const FAMILIES: &[(&str, &str, &str)] = &[
    (REQUESTS_TOTAL, "counter", "Total HTTP requests"),
    (REQUEST_DURATION_SECONDS, "histogram", "HTTP request duration in seconds"),
    (ERRORS_TOTAL, "counter", "Total HTTP errors"),
];

/// Request metrics for the whole process lifetime.
#[derive(Clone)]
pub struct MetricsRecorder {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder").finish_non_exhaustive()
    }
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
                LATENCY_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(REQUESTS_TOTAL, "Total HTTP requests");
            describe_histogram!(REQUEST_DURATION_SECONDS, "HTTP request duration in seconds");
            describe_counter!(ERRORS_TOTAL, "Total HTTP errors");
        });

        Ok(Self {
            recorder: Arc::new(recorder),
            handle,
        })
    }

    /// Record one finished request.
    pub fn record_request(&self, method: &str, endpoint: &str, status: u16, elapsed_secs: f64) {
        let method = method.to_string();
        let endpoint = endpoint.to_string();
        let status_code = status.to_string();

        metrics::with_local_recorder(self.recorder.as_ref(), || {
            counter!(
                REQUESTS_TOTAL,
                "method" => method.clone(),
                "endpoint" => endpoint.clone(),
                "status_code" => status_code.clone()
            )
            .increment(1);

            histogram!(
                REQUEST_DURATION_SECONDS,
                "method" => method.clone(),
                "endpoint" => endpoint.clone()
            )
            .record(elapsed_secs);

            if status >= 400 {
                counter!(
                    ERRORS_TOTAL,
                    "method" => method,
                    "endpoint" => endpoint,
                    "status_code" => status_code
                )
                .increment(1);
            }
        });
    }

    /// Render all metrics in the Prometheus text exposition format.
    ///
    /// Families with no samples yet are still announced with their HELP and
    /// TYPE lines, so scrapers always see all three.
    pub fn render(&self) -> String {
        let mut out = self.handle.render();
        for (name, kind, help) in FAMILIES {
            if !out.contains(&format!("# TYPE {name} ")) {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                let _ = writeln!(out, "# HELP {name} {help}");
                let _ = writeln!(out, "# TYPE {name} {kind}");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(text: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        text.lines()
            .filter(|line| line.starts_with(&format!("{name}{{")))
            .find(|line| {
                labels
                    .iter()
                    .all(|(k, v)| line.contains(&format!("{k}=\"{v}\"")))
            })
            .and_then(|line| line.rsplit(' ').next())
            .and_then(|value| value.parse().ok())
    }

    #[test]
    fn test_empty_render_announces_all_families() {
        let metrics = MetricsRecorder::new().unwrap();
        let text = metrics.render();

        assert!(text.contains("# TYPE http_requests_total counter"));
        assert!(text.contains("# TYPE http_request_duration_seconds histogram"));
        assert!(text.contains("# TYPE http_errors_total counter"));
    }

    #[test]
    fn test_success_does_not_count_as_error() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_request("GET", "/products", 200, 0.002);
        metrics.record_request("GET", "/products", 200, 0.004);

        let text = metrics.render();
        let labels = [("method", "GET"), ("endpoint", "/products"), ("status_code", "200")];
        assert_eq!(sample(&text, REQUESTS_TOTAL, &labels), Some(2.0));
        assert_eq!(sample(&text, ERRORS_TOTAL, &labels), None);
        assert_eq!(
            sample(
                &text,
                "http_request_duration_seconds_count",
                &[("method", "GET"), ("endpoint", "/products")]
            ),
            Some(2.0)
        );
    }

    #[test]
    fn test_error_status_increments_error_counter() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_request("GET", "/error", 500, 0.001);
        metrics.record_request("POST", "/checkout", 404, 0.001);

        let text = metrics.render();
        assert_eq!(
            sample(&text, ERRORS_TOTAL, &[("endpoint", "/error"), ("status_code", "500")]),
            Some(1.0)
        );
        assert_eq!(
            sample(&text, ERRORS_TOTAL, &[("method", "POST"), ("status_code", "404")]),
            Some(1.0)
        );
    }

    #[test]
    fn test_recorders_are_isolated() {
        let a = MetricsRecorder::new().unwrap();
        let b = MetricsRecorder::new().unwrap();
        a.record_request("GET", "/", 200, 0.001);

        assert!(a.render().contains("endpoint=\"/\""));
        assert!(!b.render().contains("endpoint=\"/\""));
    }

    #[test]
    fn test_render_is_idempotent() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_request("GET", "/orders", 200, 0.01);

        let labels = [("endpoint", "/orders")];
        let first = sample(&metrics.render(), REQUESTS_TOTAL, &labels);
        let second = sample(&metrics.render(), REQUESTS_TOTAL, &labels);
        assert_eq!(first, Some(1.0));
        assert_eq!(first, second);
    }
}
