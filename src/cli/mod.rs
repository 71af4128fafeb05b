pub mod account;
#[cfg(feature = "backend")]
pub mod backend;
pub mod config;
pub mod hub;
pub mod menu;
pub mod output;
pub mod registry;
pub mod transfer;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::hub::HubClient;
use crate::registry::validator::ProbePolicy;
use crate::registry::{
    default_candidate_locations, ArtifactRegistryConnector, CredentialBundle, RegistryBackend,
    RegistryConnector, DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE,
};

/// Clients shared by every command of one invocation
pub struct CliContext {
    pub hub: HubClient,
    pub connector: Arc<dyn RegistryConnector>,
    pub locations: Vec<String>,
    pub probe_policy: ProbePolicy,
    credentials_flag: Option<PathBuf>,
}

impl CliContext {
    pub fn new(credentials_flag: Option<PathBuf>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("artifact-browser/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            hub: HubClient::new(
                http_client.clone(),
                crate::hub::DEFAULT_BASE_URL,
                crate::hub::DEFAULT_PAGE_SIZE,
            ),
            connector: Arc::new(ArtifactRegistryConnector::new(
                http_client,
                DEFAULT_API_BASE_URL,
                DEFAULT_PAGE_SIZE,
            )),
            locations: default_candidate_locations(),
            probe_policy: ProbePolicy::default(),
            credentials_flag,
        })
    }

    /// Load the key file. Failing here ends the process.
    pub fn load_credentials(&self) -> Result<CredentialBundle> {
        let path = config::credentials_path(self.credentials_flag.as_deref())?;
        config::load_credentials(&path)
    }

    /// Load the key file and connect a registry backend for it
    pub fn session(&self) -> Result<Session> {
        let bundle = self.load_credentials()?;
        let backend = self.connector.connect(&bundle);
        Ok(Session { bundle, backend })
    }
}

/// A loaded key and the registry backend acting with it
pub struct Session {
    pub bundle: CredentialBundle,
    pub backend: Arc<dyn RegistryBackend>,
}
