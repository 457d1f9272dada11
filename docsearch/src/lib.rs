//! # Docsearch
//!
//! Entry point for applications using the docsearch facade: reads the
//! environment, installs logging, and hands back a connected `SearchClient`.

pub mod config;
pub mod telemetry;

pub use config::{Dependencies, LogFormat, Settings};

use thiserror::Error;

/// Errors that can occur while setting up the facade.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] docsearch_repository::SearchError),

    /// Logging could not be installed.
    #[error("Telemetry error: {0}")]
    TelemetryError(String),
}

impl SetupError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
