//! Route table.
//!
//! # Responsibilities
//! - List every (method, path template) the service answers
//! - Turn the list into an axum router
//!
//! # Design Decisions
//! - Explicit table instead of scattered `.route` calls
//! - Path templates double as the metrics endpoint label
//! - Immutable after construction

use axum::handler::Handler;
use axum::http::Method;
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Router;

use crate::handlers::{orders, products, system};
use crate::http::server::AppState;

/// One table entry.
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    endpoint: MethodRouter<AppState>,
}

impl Route {
    fn new<H, T>(method: Method, filter: MethodFilter, path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            method,
            path,
            endpoint: on(filter, handler),
        }
    }

    pub fn get<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(Method::GET, MethodFilter::GET, path, handler)
    }

    pub fn post<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(Method::POST, MethodFilter::POST, path, handler)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Ordered collection of routes.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The service's routes.
    pub fn standard() -> Self {
        Self::new(vec![
            Route::get("/", system::root),
            Route::get("/products", products::list_products),
            Route::post("/checkout", orders::checkout),
            Route::get("/orders", orders::list_orders),
            Route::get("/error", system::simulate_error),
            Route::get("/metrics", system::metrics),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Register every entry. Entries sharing a path merge their methods.
    pub fn into_router(self) -> Router<AppState> {
        self.routes
            .into_iter()
            .fold(Router::new(), |router, route| {
                router.route(route.path, route.endpoint)
            })
    }
}
