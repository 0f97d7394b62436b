//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Find config/ → Load properties → Build Logger → Install tracing
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → Stop accepting → Drain in-flight requests
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, then listeners
//! - Startup failures end the process; nothing runs half-configured

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, bootstrap_or_exit, Bootstrap, StartupOptions};
