//! Error types for the graph pipeline.

use thiserror::Error;

/// Reasons the graph could not be built
///
/// Every variant is terminal: the pipeline logs it once and never retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The request could not be sent or its body could not be read
    #[error("Failed to fetch {url}: {message}")]
    Fetch {
        /// Requested URL
        url: String,
        /// Transport error
        message: String,
    },

    /// The server answered with a non-success status
    #[error("Fetching {url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The name selector could not be compiled
    #[error("Invalid selector '{selector}': {message}")]
    Selector {
        /// Selector text
        selector: String,
        /// Parser message
        message: String,
    },
}

/// Invalid configuration value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value that must be positive was not
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    /// The source URL is not http(s)
    #[error("GRAPH_SOURCE_URL must start with http:// or https://, got '{0}'")]
    UnsupportedUrl(String),
}
