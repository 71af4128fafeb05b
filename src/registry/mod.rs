pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod models;
pub mod scan;
pub mod validator;

pub use client::ArtifactRegistryClient;
pub use credentials::{CredentialBundle, CredentialError, CredentialInput};
pub use error::{RegistryError, UpstreamCode};

use async_trait::async_trait;
use models::{DockerImage, Package, Repository, Version};
use std::sync::Arc;

/// Default Artifact Registry REST endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://artifactregistry.googleapis.com/v1";

/// Regions scanned when the caller's locations are not known in advance
pub const DEFAULT_CANDIDATE_LOCATIONS: &[&str] = &[
    "us-central1",
    "us-east1",
    "us-west1",
    "europe-west1",
    "asia-east1",
];

/// Default page size requested from the registry API
pub const DEFAULT_PAGE_SIZE: u32 = 100;

pub fn default_candidate_locations() -> Vec<String> {
    DEFAULT_CANDIDATE_LOCATIONS
        .iter()
        .map(|l| l.to_string())
        .collect()
}

/// Parent resource path for a set of location/repository/package segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    pub project: String,
    pub location: String,
    pub repository: Option<String>,
    pub package: Option<String>,
}

impl ResourcePath {
    pub fn location(project: &str, location: &str) -> Self {
        Self {
            project: project.to_string(),
            location: location.to_string(),
            repository: None,
            package: None,
        }
    }

    pub fn repository(project: &str, location: &str, repository: &str) -> Self {
        Self {
            repository: Some(repository.to_string()),
            ..Self::location(project, location)
        }
    }

    pub fn package(project: &str, location: &str, repository: &str, package: &str) -> Self {
        Self {
            package: Some(package.to_string()),
            ..Self::repository(project, location, repository)
        }
    }
}

impl std::fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "projects/{}/locations/{}", self.project, self.location)?;
        if let Some(repository) = &self.repository {
            write!(f, "/repositories/{}", repository)?;
        }
        if let Some(package) = &self.package {
            // Package ids containing slashes are escaped inside resource names
            write!(f, "/packages/{}", package.replace('/', "%2F"))?;
        }
        Ok(())
    }
}

/// Read-only view of a project's registry
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Project all listing calls are scoped to
    fn project_id(&self) -> &str;

    async fn list_repositories(&self, location: &str) -> Result<Vec<Repository>, RegistryError>;

    async fn list_packages(
        &self,
        location: &str,
        repository: &str,
    ) -> Result<Vec<Package>, RegistryError>;

    async fn list_versions(
        &self,
        location: &str,
        repository: &str,
        package: &str,
    ) -> Result<Vec<Version>, RegistryError>;

    async fn list_docker_images(
        &self,
        location: &str,
        repository: &str,
    ) -> Result<Vec<DockerImage>, RegistryError>;
}

/// Builds a backend for a validated credential bundle
pub trait RegistryConnector: Send + Sync {
    fn connect(&self, bundle: &CredentialBundle) -> Arc<dyn RegistryBackend>;
}

/// Connector for the live Artifact Registry API
#[derive(Clone)]
pub struct ArtifactRegistryConnector {
    http_client: reqwest::Client,
    api_base_url: String,
    token_uri: String,
    page_size: u32,
}

impl ArtifactRegistryConnector {
    pub fn new(http_client: reqwest::Client, api_base_url: impl Into<String>, page_size: u32) -> Self {
        Self {
            http_client,
            api_base_url: api_base_url.into(),
            token_uri: auth::DEFAULT_TOKEN_URI.to_string(),
            page_size,
        }
    }

    /// Exchange assertions at this endpoint instead of Google's
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }
}

impl RegistryConnector for ArtifactRegistryConnector {
    fn connect(&self, bundle: &CredentialBundle) -> Arc<dyn RegistryBackend> {
        let token_provider = Arc::new(auth::ServiceAccountTokenProvider::new(
            self.http_client.clone(),
            bundle,
            &self.token_uri,
        ));
        Arc::new(ArtifactRegistryClient::new(
            self.http_client.clone(),
            &self.api_base_url,
            self.page_size,
            &bundle.project_id,
            token_provider,
        ))
    }
}
