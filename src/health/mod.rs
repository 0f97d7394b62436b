//! Health endpoints.
//!
//! # Design Decisions
//! - Liveness only: the probe answers as long as the process can serve
//!   HTTP, it does not check dependencies
//! - Fixed body so orchestrators can match on it

pub mod ping;

pub use ping::{handle_ping, ping_route, router, PING_PATH};
