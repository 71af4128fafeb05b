use crate::hub::HubClient;
use crate::registry::validator::ProbePolicy;
use crate::registry::{ArtifactRegistryConnector, RegistryConnector};
use crate::server::settings::{RegistrySettings, Settings};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Shared state for HTTP handlers. Nothing in here is mutated after startup;
/// credentials arrive with every request.
#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn RegistryConnector>,
    pub hub: Arc<HubClient>,
    pub probe_policy: Arc<ProbePolicy>,
    pub registry_settings: Arc<RegistrySettings>,
}

impl AppState {
    /// Build state talking to the live registry and Docker Hub
    pub fn new(settings: &Settings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("artifact-browser/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let connector = Arc::new(
            ArtifactRegistryConnector::new(
                http_client.clone(),
                settings.registry.api_base_url.clone(),
                settings.registry.page_size,
            )
            .with_token_uri(settings.registry.token_uri.clone()),
        );

        tracing::info!(
            api_base_url = %settings.registry.api_base_url,
            token_uri = %settings.registry.token_uri,
            locations = ?settings.registry.candidate_locations,
            "Registry adapter configured"
        );

        Ok(Self::with_connector(settings, connector, http_client))
    }

    /// Build state around an arbitrary registry connector
    pub fn with_connector(
        settings: &Settings,
        connector: Arc<dyn RegistryConnector>,
        http_client: reqwest::Client,
    ) -> Self {
        let hub = HubClient::new(http_client, &settings.hub.base_url, settings.hub.page_size);

        Self {
            connector,
            hub: Arc::new(hub),
            probe_policy: Arc::new(settings.validation.clone()),
            registry_settings: Arc::new(settings.registry.clone()),
        }
    }
}
