//! Configuration for the graph host.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::ConfigError;
use crate::types::{HEIGHT, WIDTH};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Page listing the operators
pub const DEFAULT_SOURCE_URL: &str = "https://rxjs.dev/guide/operators";

/// Graph host configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Document to scrape
    pub source_url: String,
    /// File rewritten with the SVG on every tick
    pub output_path: PathBuf,
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Milliseconds between simulation steps
    pub tick_interval_ms: u64,
    /// Request timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Seed for the layout's tie-breaking jiggle
    pub seed: u64,
    /// Log filter (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// anything missing or unparseable.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            source_url: lookup("GRAPH_SOURCE_URL")
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            output_path: lookup("GRAPH_OUTPUT_PATH")
                .map_or_else(|| PathBuf::from("operators.svg"), PathBuf::from),
            width: lookup("GRAPH_WIDTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(WIDTH),
            height: lookup("GRAPH_HEIGHT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(HEIGHT),
            tick_interval_ms: lookup("GRAPH_TICK_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(16), // one frame at 60Hz
            fetch_timeout_secs: lookup("GRAPH_FETCH_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            seed: lookup("GRAPH_SEED")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Check values that would make the pipeline meaningless
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a non-positive canvas or timeout, or a
    /// source URL that is not http(s).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive(self.width) {
            return Err(ConfigError::NotPositive("GRAPH_WIDTH"));
        }
        if !is_positive(self.height) {
            return Err(ConfigError::NotPositive("GRAPH_HEIGHT"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::NotPositive("GRAPH_FETCH_TIMEOUT_SECS"));
        }
        if !self.source_url.starts_with("http://") && !self.source_url.starts_with("https://") {
            return Err(ConfigError::UnsupportedUrl(self.source_url.clone()));
        }
        Ok(())
    }

    /// Pause between simulation steps
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Request timeout
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
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

    fn with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_match_the_original_canvas() {
        let config = Config::default();
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert!((config.width - 960.0).abs() < f64::EPSILON);
        assert!((config.height - 600.0).abs() < f64::EPSILON);
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn reads_overrides() {
        let config = with(&[
            ("GRAPH_SOURCE_URL", "http://localhost:8000/ops.html"),
            ("GRAPH_WIDTH", "400"),
            ("GRAPH_TICK_INTERVAL_MS", "0"),
            ("GRAPH_SEED", "9"),
        ]);
        assert_eq!(config.source_url, "http://localhost:8000/ops.html");
        assert!((config.width - 400.0).abs() < f64::EPSILON);
        assert_eq!(config.tick_interval_ms, 0);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            with(&[("GRAPH_WIDTH", "-1")]).validate(),
            Err(ConfigError::NotPositive("GRAPH_WIDTH"))
        );
        assert_eq!(
            with(&[("GRAPH_HEIGHT", "NaN")]).validate(),
            Err(ConfigError::NotPositive("GRAPH_HEIGHT"))
        );
        assert!(matches!(
            with(&[("GRAPH_SOURCE_URL", "file:///etc/passwd")]).validate(),
            Err(ConfigError::UnsupportedUrl(_))
        ));
    }
}
