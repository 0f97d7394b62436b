//! Severity levels and textual level mapping.
//!
//! # Design Decisions
//! - Unknown level names fall back to `Debug` instead of failing, so a
//!   misconfigured `LOG_LEVEL` neither silences the service nor stops it
//! - `Disabled` is the top of the order: as a threshold it gates everything

use std::fmt;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;

/// Ordered logging severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
    Disabled,
}

impl Severity {
    /// Canonical lowercase name, as written to the `logLevel` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Panic => "panic",
            Severity::Disabled => "disabled",
        }
    }

    /// Whether a record at `self` passes a `threshold`.
    pub fn passes(self, threshold: Severity) -> bool {
        self != Severity::Disabled && threshold != Severity::Disabled && self >= threshold
    }
}

/// Map a level name to a [`Severity`].
///
/// The name is trimmed and case-folded; anything unrecognised maps to
/// [`Severity::Debug`].
pub fn map_level(name: &str) -> Severity {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Severity::Trace,
        "debug" => Severity::Debug,
        "info" => Severity::Info,
        "warn" => Severity::Warn,
        "error" => Severity::Error,
        "fatal" => Severity::Fatal,
        "panic" => Severity::Panic,
        "disabled" => Severity::Disabled,
        _ => Severity::Debug,
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(map_level(s))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Severity> for LevelFilter {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Trace => LevelFilter::TRACE,
            Severity::Debug => LevelFilter::DEBUG,
            Severity::Info => LevelFilter::INFO,
            Severity::Warn => LevelFilter::WARN,
            // tracing has nothing above ERROR
            Severity::Error | Severity::Fatal | Severity::Panic => LevelFilter::ERROR,
            Severity::Disabled => LevelFilter::OFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_level_normalizes_input() {
        let cases = [
            ("TRACE", Severity::Trace),
            ("Debug", Severity::Debug),
            (" info ", Severity::Info),
            ("warn", Severity::Warn),
            ("ERROR", Severity::Error),
            ("fatal", Severity::Fatal),
            ("panic", Severity::Panic),
            ("disabled", Severity::Disabled),
        ];

        for (name, expected) in cases {
            assert_eq!(map_level(name), expected, "input {:?}", name);
            assert_eq!(map_level(&name.trim().to_lowercase()), expected);
        }
    }

    #[test]
    fn test_map_level_defaults_to_debug() {
        assert_eq!(map_level(""), Severity::Debug);
        assert_eq!(map_level("   "), Severity::Debug);
        assert_eq!(map_level("verbose"), Severity::Debug);
        assert_eq!(map_level("warning"), Severity::Debug);
    }

    #[test]
    fn test_ordering_and_gate() {
        assert!(Severity::Trace < Severity::Debug);
        assert!(Severity::Panic < Severity::Disabled);

        assert!(Severity::Info.passes(Severity::Info));
        assert!(Severity::Error.passes(Severity::Info));
        assert!(!Severity::Debug.passes(Severity::Info));
        assert!(!Severity::Panic.passes(Severity::Disabled));
        assert!(!Severity::Disabled.passes(Severity::Trace));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let level: Severity = "Warn".parse().unwrap();
        assert_eq!(level.to_string(), "warn");
        assert_eq!(LevelFilter::from(Severity::Fatal), LevelFilter::ERROR);
        assert_eq!(LevelFilter::from(Severity::Disabled), LevelFilter::OFF);
    }
}
