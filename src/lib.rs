//! Common service toolkit
//!
//! Shared plumbing for HTTP microservices: a structured JSON logger with
//! request scopes, `EndInfo`/fault/metrics records, HTTP trace dumps, the
//! `/_internal/_ping` liveness probe, embedded API docs and the
//! properties-file bootstrap.

pub mod assets;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod util;

pub use config::{Properties, ServiceConfig, SharedProperties};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::{EndInfo, ExceptionInfo, FaultDetails, Logger, Severity};
