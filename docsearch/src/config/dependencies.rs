//! Dependency initialization and wiring for the search facade.

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::SetupError;
use docsearch_repository::SearchClient;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The connected search facade, shareable across tasks.
    pub client: Arc<SearchClient>,
    /// The settings the dependencies were built from.
    pub settings: Settings,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`Settings::from_env`] for the recognized variables.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(SetupError)` - If configuration is invalid or the service is unreachable
    pub async fn new() -> Result<Self, SetupError> {
        Self::from_settings(Settings::from_env()?).await
    }

    /// Initialize all dependencies from already-loaded settings.
    pub async fn from_settings(settings: Settings) -> Result<Self, SetupError> {
        info!(url = %settings.client.url(), "Initializing dependencies");

        let client = SearchClient::connect(settings.client.clone())?;

        // Verify the search service is reachable
        let healthy = client
            .health_check()
            .await
            .map_err(|e| SetupError::config(format!("Search service health check failed: {}", e)))?;

        if !healthy {
            return Err(SetupError::config("Search cluster is unhealthy"));
        }

        info!("Search service connection verified");

        Ok(Self {
            client: Arc::new(client),
            settings,
        })
    }
}
