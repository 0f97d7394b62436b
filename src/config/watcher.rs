//! Properties file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::{load_file, ConfigError};
use crate::config::SharedProperties;

/// Watches a properties file and swaps reloaded contents into a
/// [`SharedProperties`].
pub struct ConfigWatcher {
    path: PathBuf,
    properties: SharedProperties,
}

impl ConfigWatcher {
    pub fn new(path: &Path, properties: SharedProperties) -> Self {
        Self {
            path: path.to_path_buf(),
            properties,
        }
    }

    /// Reload the file now. On failure the current properties stay.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let properties = load_file(&self.path)?;
        tracing::info!(path = ?self.path, keys = properties.len(), "Config reloaded");
        self.properties.store(properties);
        Ok(())
    }

    /// Start watching the file in a background thread. Dropping the returned
    /// watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        if let Err(e) = self.reload() {
                            tracing::error!(
                                "Failed to reload config: {}. Keeping current configuration.",
                                e
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
