//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer)
//!     → request.rs (scoped logger with transaction ids)
//!     → handler (/_internal/_ping, /swagger/*, merged routes)
//!     → request.rs (ProcessMetrics sample)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestLogger, RequestScope, X_TRANSACTION_ID};
pub use server::HttpServer;
