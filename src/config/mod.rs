//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! working directory
//!     → loader.rs (walk up to config/, read <GO_PROFILE>.properties)
//!     → schema.rs (Properties, LoggingSettings, ServiceConfig)
//!     → SharedProperties (Arc, readable from any task)
//!
//! On file change:
//!     watcher.rs detects modification
//!     → loader.rs reloads the file
//!     → atomic swap inside SharedProperties
//! ```
//!
//! # Design Decisions
//! - Every key read at startup is mandatory; a missing key is fatal there
//! - Reloads only affect later lookups; the logger is never rebuilt
//! - A reload that fails keeps the previous properties

use std::sync::Arc;

use arc_swap::ArcSwap;

pub mod loader;
pub mod schema;
pub mod watcher;

pub use loader::ConfigError;
pub use schema::{LoggingSettings, Properties, ServiceConfig};

/// Properties that can be swapped at runtime.
#[derive(Debug, Clone)]
pub struct SharedProperties {
    inner: Arc<ArcSwap<Properties>>,
}

impl SharedProperties {
    pub fn new(properties: Properties) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(properties)),
        }
    }

    /// Snapshot of the current properties.
    pub fn load(&self) -> Arc<Properties> {
        self.inner.load_full()
    }

    pub fn store(&self, properties: Properties) {
        self.inner.store(Arc::new(properties));
    }

    pub fn get_env(&self, key: &str) -> Result<String, ConfigError> {
        self.inner.load().get_env(key).map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_replaces_snapshot() {
        let shared = SharedProperties::new([("LOG_LEVEL", "info")].into_iter().collect());
        let before = shared.load();

        shared.store([("LOG_LEVEL", "error")].into_iter().collect());

        assert_eq!(before.get_env("LOG_LEVEL").unwrap(), "info");
        assert_eq!(shared.get_env("LOG_LEVEL").unwrap(), "error");
        assert!(shared.get_env("MISSING").is_err());
    }
}
