//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router from the route table
//! - Wire up middleware (pipeline, tracing, body limit, panic catcher)
//! - Bind server to listener
//! - Stop gracefully on signal or shutdown broadcast

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::pipeline::observe_request;
use crate::http::response::{method_not_allowed, not_found, panic_response};
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::{MetricsRecorder, RequestSpan};
use crate::routing::RouteTable;
use crate::store::Store;

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Store,
    pub metrics: MetricsRecorder,
}

/// HTTP server for the e-commerce service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, store: Store, metrics: MetricsRecorder) -> Self {
        let state = AppState { store, metrics };
        let router = Self::build_router(&config, RouteTable::standard(), state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost-last: the pipeline sees the final response of
    /// everything below it, including caught panics and body-limit rejections.
    /// The body limit is enforced by the `Json` extractor, so an oversized
    /// body surfaces as `ApiError::PayloadTooLarge` like any other failure.
    pub fn build_router(config: &ServiceConfig, table: RouteTable, state: AppState) -> Router {
        for route in table.iter() {
            tracing::debug!(method = %route.method, path = route.path, "Registering route");
        }

        table
            .into_router()
            .method_not_allowed_fallback(method_not_allowed)
            .fallback(not_found)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TraceLayer::new_for_http().make_span_with(RequestSpan::new(&config.tracing)))
            .layer(middleware::from_fn_with_state(
                state.metrics.clone(),
                observe_request,
            ))
            .with_state(state)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
