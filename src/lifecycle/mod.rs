//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging → Check store → Build metrics → Bind → Serve
//!
//! Shutdown:
//!     SIGINT/SIGTERM (signals.rs) or Shutdown::trigger (shutdown.rs)
//!     → stop accepting → drain in-flight requests → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
