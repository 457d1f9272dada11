//! Environment-driven settings.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use docsearch_repository::{ClientConfig, RefreshPolicy};

use crate::SetupError;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Settings for the facade and its logging.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub client: ClientConfig,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from the process environment, after applying `.env`.
    ///
    /// # Environment Variables
    ///
    /// - `DOCSEARCH_HOST`: search service host (default: localhost)
    /// - `DOCSEARCH_PORT`: search service port (default: 9200)
    /// - `DOCSEARCH_SCHEME`: `http` or `https` (default: http)
    /// - `DOCSEARCH_TIMEOUT_SECS`: request timeout, `0` disables it (default: 30)
    /// - `DOCSEARCH_MAX_RESULT_SIZE`: cap for convenience searches (default: 10000)
    /// - `DOCSEARCH_REFRESH`: `none`, `wait_for` or `true` (default: none)
    /// - `DOCSEARCH_LOG_FORMAT`: `text` or `json` (default: text)
    pub fn from_env() -> Result<Self, SetupError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SetupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut client = ClientConfig::default();

        if let Some(host) = lookup("DOCSEARCH_HOST") {
            client.host = host;
        }
        if let Some(port) = parse_var::<u16>(&lookup, "DOCSEARCH_PORT")? {
            client.port = port;
        }
        if let Some(scheme) = lookup("DOCSEARCH_SCHEME") {
            if scheme != "http" && scheme != "https" {
                return Err(SetupError::config(format!(
                    "DOCSEARCH_SCHEME must be http or https, got '{}'",
                    scheme
                )));
            }
            client.scheme = scheme;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "DOCSEARCH_TIMEOUT_SECS")? {
            client.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(size) = parse_var::<usize>(&lookup, "DOCSEARCH_MAX_RESULT_SIZE")? {
            client.max_result_size = size;
        }
        if let Some(refresh) = parse_var::<RefreshPolicy>(&lookup, "DOCSEARCH_REFRESH")? {
            client.refresh = refresh;
        }
        let log_format = parse_var::<LogFormat>(&lookup, "DOCSEARCH_LOG_FORMAT")?.unwrap_or_default();

        Ok(Self { client, log_format })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, SetupError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SetupError::config(format!("invalid {}='{}': {}", key, raw, e))),
    }
}
