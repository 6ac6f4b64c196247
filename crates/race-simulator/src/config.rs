//! # Analyzer Configuration
//!
//! Environment-based defaults for the `race-analyzer` binary. Command-line
//! arguments take precedence over everything read here.

use std::env;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// First season analysed when `--year-min` is absent
    pub year_min: i32,

    /// Last season analysed when `--year-max` is absent
    pub year_max: i32,

    /// Leaderboard length when `--top` is absent
    pub top_n: usize,

    /// Default tracing directive, `RUST_LOG` overrides it
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            year_min: lookup("RACE_YEAR_MIN")
                .and_then(|v| v.parse().ok())
                .unwrap_or(2022),

            year_max: lookup("RACE_YEAR_MAX")
                .and_then(|v| v.parse().ok())
                .unwrap_or(2024),

            top_n: lookup("RACE_TOP_N")
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            log_format: lookup("LOG_FORMAT")
                .map(|v| {
                    if v.eq_ignore_ascii_case("json") {
                        LogFormat::Json
                    } else {
                        LogFormat::Pretty
                    }
                })
                .unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.year_min, 2022);
        assert_eq!(config.year_max, 2024);
        assert_eq!(config.top_n, 20);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("RACE_YEAR_MIN", "2010"),
            ("RACE_YEAR_MAX", "2013"),
            ("RACE_TOP_N", "5"),
            ("LOG_LEVEL", "race_analytics=debug"),
            ("LOG_FORMAT", "JSON"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(ToString::to_string));
        assert_eq!(config.year_min, 2010);
        assert_eq!(config.year_max, 2013);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.log_level, "race_analytics=debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = Config::from_lookup(|key| (key == "RACE_TOP_N").then(|| "many".to_string()));
        assert_eq!(config.top_n, 20);
    }
}
