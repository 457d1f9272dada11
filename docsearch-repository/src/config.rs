//! Configuration types for the SearchClient.

use std::time::Duration;

/// Default host of the search service.
pub const DEFAULT_HOST: &str = "localhost";

/// Default port of the search service.
pub const DEFAULT_PORT: u16 = 9200;

/// Default cap on the number of documents returned by convenience searches.
pub const DEFAULT_MAX_RESULT_SIZE: usize = 10_000;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// When document writes become visible to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Leave visibility to the index's refresh interval.
    #[default]
    None,
    /// Block the write until the next refresh makes it visible.
    WaitFor,
    /// Force a refresh of the affected shards right after the write.
    Immediate,
}

impl std::str::FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "false" => Ok(Self::None),
            "wait_for" => Ok(Self::WaitFor),
            "true" | "immediate" => Ok(Self::Immediate),
            other => Err(format!("unknown refresh policy: {}", other)),
        }
    }
}

/// Configuration for the SearchClient.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host name or address of the search service.
    pub host: String,
    /// Port of the search service.
    pub port: u16,
    /// `http` or `https`.
    pub scheme: String,
    /// Timeout applied to every request. `None` leaves the transport default.
    pub timeout: Option<Duration>,
    /// Maximum number of documents returned by `get_all_documents` and the
    /// other convenience searches.
    pub max_result_size: usize,
    /// Visibility policy for document writes.
    pub refresh: RefreshPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            scheme: "http".to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            max_result_size: DEFAULT_MAX_RESULT_SIZE,
            refresh: RefreshPolicy::None,
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the URL scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the result size cap of convenience searches.
    pub fn with_max_result_size(mut self, max_result_size: usize) -> Self {
        self.max_result_size = max_result_size;
        self
    }

    /// Set the refresh policy for writes.
    pub fn with_refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }

    /// Base URL of the search service.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}
