//! Startup orchestration.
//!
//! # Responsibilities
//! - Locate and load the properties file
//! - Build the process logger exactly once
//! - Install the `tracing` subscriber for the crate's own diagnostics
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The logger is built from `LOG_LEVEL` / `DEV_DEBUG_MODE` and never rebuilt

use std::path::{Path, PathBuf};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::loader::{self, ConfigError};
use crate::config::{LoggingSettings, Properties, ServiceConfig, SharedProperties};
use crate::observability::Logger;

/// Everything the composition root needs after startup.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub config: ServiceConfig,
    pub properties: SharedProperties,
    /// File the properties came from, for the watcher.
    pub properties_path: PathBuf,
    pub logger: Logger,
}

/// Where to look for configuration. `None` fields fall back to the
/// upward directory search and `GO_PROFILE`.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_dir: Option<PathBuf>,
    pub profile: Option<String>,
}

/// Build the process logger from `LOG_LEVEL` and `DEV_DEBUG_MODE`.
pub fn init_logger(properties: &Properties) -> Result<Logger, ConfigError> {
    let settings = LoggingSettings::from_properties(properties)?;
    Ok(Logger::from_settings(settings.level, settings.dev_debug_mode))
}

pub fn bootstrap(options: &StartupOptions) -> Result<Bootstrap, ConfigError> {
    let dir = match &options.config_dir {
        Some(dir) => dir.clone(),
        None => loader::find_config_dir(&std::env::current_dir()?)?,
    };
    let profile = options
        .profile
        .clone()
        .unwrap_or_else(loader::profile_from_env);

    bootstrap_from(&dir, &profile)
}

pub fn bootstrap_from(dir: &Path, profile: &str) -> Result<Bootstrap, ConfigError> {
    let properties_path = loader::properties_path(dir, profile);
    let properties = loader::load_file(&properties_path)?;
    let config = ServiceConfig::from_properties(&properties)?;
    let logger = Logger::from_settings(config.logging.level, config.logging.dev_debug_mode);

    Ok(Bootstrap {
        config,
        properties: SharedProperties::new(properties),
        properties_path,
        logger,
    })
}

/// [`bootstrap`], exiting the process on failure.
pub fn bootstrap_or_exit(options: &StartupOptions) -> Bootstrap {
    match bootstrap(options) {
        Ok(boot) => boot,
        Err(e) => {
            // no logger exists yet
            eprintln!("fatal error {}", e);
            std::process::exit(1)
        }
    }
}

/// Level for the crate's own diagnostics when `RUST_LOG` is unset. Follows
/// the service logger, so dev debug mode opens it to `trace` as well.
pub fn tracing_level(settings: &LoggingSettings) -> LevelFilter {
    LevelFilter::from(settings.effective_level())
}

/// Install the `tracing` subscriber. `RUST_LOG` wins over the configured level.
///
/// Diagnostics go to stderr; stdout carries only the service's JSON records.
pub fn init_tracing(settings: &LoggingSettings) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(tracing_level(settings).into()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
