//! Configuration schema definitions.
//!
//! Properties are flat `KEY=value` pairs. Typed settings are read out of
//! them once, at startup.

use std::collections::HashMap;

use crate::config::loader::ConfigError;
use crate::observability::level::{map_level, Severity};

pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const DEV_DEBUG_MODE: &str = "DEV_DEBUG_MODE";
pub const SERVER_ADDRESS: &str = "SERVER_ADDRESS";
pub const METRICS_ADDRESS: &str = "METRICS_ADDRESS";
pub const SERVICE_NAME: &str = "SERVICE_NAME";

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_SERVICE_NAME: &str = "common-service";

/// Parsed properties file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Value for `key`; empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Mandatory lookup.
    pub fn get_env(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_owned()))
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Properties::default();
        for (key, value) in iter {
            properties.insert(key, value);
        }
        properties
    }
}

/// Settings that shape the process logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: Severity,
    /// Console output with every level open.
    pub dev_debug_mode: bool,
}

impl LoggingSettings {
    /// Both keys are mandatory.
    pub fn from_properties(properties: &Properties) -> Result<Self, ConfigError> {
        Ok(Self {
            level: map_level(properties.get_env(LOG_LEVEL)?),
            dev_debug_mode: properties.get_env(DEV_DEBUG_MODE)? == "true",
        })
    }

    /// Threshold actually in force: dev debug mode opens every level.
    pub fn effective_level(&self) -> Severity {
        if self.dev_debug_mode {
            Severity::Trace
        } else {
            self.level
        }
    }
}

/// Settings for the service binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub server_address: String,
    /// Prometheus scrape address; no exporter when absent.
    pub metrics_address: Option<String>,
    /// Reported as `serviceName` in process metrics.
    pub service_name: String,
    pub logging: LoggingSettings,
}

impl ServiceConfig {
    pub fn from_properties(properties: &Properties) -> Result<Self, ConfigError> {
        Ok(Self {
            server_address: properties
                .get_or(SERVER_ADDRESS, DEFAULT_SERVER_ADDRESS)
                .to_owned(),
            metrics_address: properties.get(METRICS_ADDRESS).map(str::to_owned),
            service_name: properties
                .get_or(SERVICE_NAME, DEFAULT_SERVICE_NAME)
                .to_owned(),
            logging: LoggingSettings::from_properties(properties)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_treats_empty_as_missing() {
        let props: Properties = [("LOG_LEVEL", "info"), ("EMPTY", "")].into_iter().collect();

        assert_eq!(props.get_env("LOG_LEVEL").unwrap(), "info");
        let err = props.get_env("EMPTY").unwrap_err();
        assert_eq!(err.to_string(), "config EMPTY not found");
        assert!(matches!(
            props.get_env("ABSENT"),
            Err(ConfigError::MissingKey(k)) if k == "ABSENT"
        ));
    }

    #[test]
    fn test_logging_settings() {
        let props: Properties = [(LOG_LEVEL, " WARN "), (DEV_DEBUG_MODE, "true")]
            .into_iter()
            .collect();
        let settings = LoggingSettings::from_properties(&props).unwrap();
        assert_eq!(settings.level, Severity::Warn);
        assert!(settings.dev_debug_mode);

        let props: Properties = [(LOG_LEVEL, "loud"), (DEV_DEBUG_MODE, "yes")]
            .into_iter()
            .collect();
        let settings = LoggingSettings::from_properties(&props).unwrap();
        assert_eq!(settings.level, Severity::Debug);
        assert!(!settings.dev_debug_mode);
    }

    #[test]
    fn test_logging_settings_require_keys() {
        let props: Properties = [(LOG_LEVEL, "info")].into_iter().collect();
        assert!(matches!(
            LoggingSettings::from_properties(&props),
            Err(ConfigError::MissingKey(k)) if k == DEV_DEBUG_MODE
        ));
    }

    #[test]
    fn test_service_config_defaults() {
        let props: Properties = [(LOG_LEVEL, "info"), (DEV_DEBUG_MODE, "false")]
            .into_iter()
            .collect();
        let config = ServiceConfig::from_properties(&props).unwrap();
        assert_eq!(config.server_address, "0.0.0.0:8080");
        assert_eq!(config.metrics_address, None);
        assert_eq!(config.service_name, "common-service");
        assert_eq!(config.logging.level, Severity::Info);
    }
}
