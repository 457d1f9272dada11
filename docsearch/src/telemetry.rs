//! Logging setup.

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::SetupError;

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`; falls back to `info`. Fails if a global subscriber is
/// already installed.
pub fn init(format: LogFormat) -> Result<(), SetupError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| SetupError::TelemetryError(e.to_string()))
}
