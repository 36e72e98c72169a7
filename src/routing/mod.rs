//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteTable::standard()
//!     → (method, path template, handler) entries
//!     → axum Router
//!
//! Per request:
//!     axum matches the template
//!     → MatchedPath extension (read by the pipeline for labels)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Routes fixed at startup, immutable at runtime
//! - Deterministic: same input always matches same route

pub mod table;

pub use table::{Route, RouteTable};
