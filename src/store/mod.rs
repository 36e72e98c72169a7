//! Relational store access.
//!
//! # Data Flow
//! ```text
//! handler
//!     → gateway.rs (open connection, run statement, close connection)
//!     → rows as ordered column → value maps, or rows-affected + generated id
//!     → StoreError on any engine failure
//! ```
//!
//! # Design Decisions
//! - One connection per logical call, never held across requests
//! - Blocking SQLite work runs on Tokio's blocking pool
//! - Schema creation lives in setup.rs and is never invoked by the service

pub mod error;
pub mod gateway;
pub mod setup;

pub use error::{StoreError, StoreResult};
pub use gateway::{Execution, Row, SqlValue, Store};
