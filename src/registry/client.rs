use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AccessTokenProvider;
use super::error::RegistryError;
use super::models::{DockerImage, Package, Repository, Version};
use super::{RegistryBackend, ResourcePath};

/// One page of a list response. The item field name differs per resource,
/// so it is captured with a flattened map and pulled out by key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(flatten)]
    items: serde_json::Map<String, serde_json::Value>,
}

/// Artifact Registry REST adapter scoped to one project
pub struct ArtifactRegistryClient {
    http_client: Client,
    api_base_url: String,
    page_size: u32,
    project_id: String,
    token_provider: Arc<dyn AccessTokenProvider>,
}

impl ArtifactRegistryClient {
    pub fn new(
        http_client: Client,
        api_base_url: &str,
        page_size: u32,
        project_id: &str,
        token_provider: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http_client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            page_size,
            project_id: project_id.to_string(),
            token_provider,
        }
    }

    /// Fetch every page of `{parent}/{collection}` and decode the items
    /// stored under `field`.
    async fn list_all<T: DeserializeOwned>(
        &self,
        parent: &ResourcePath,
        collection: &str,
        field: &str,
        extra_query: &[(&str, &str)],
    ) -> Result<Vec<T>, RegistryError> {
        let token = self.token_provider.access_token().await?;
        let url = format!("{}/{}/{}", self.api_base_url, parent, collection);
        let page_size = self.page_size.to_string();

        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![("pageSize", page_size.clone())];
            query.extend(extra_query.iter().map(|(k, v)| (*k, v.to_string())));
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            tracing::debug!(url = %url, "Listing registry resources");

            let response = self
                .http_client
                .get(&url)
                .bearer_auth(&token)
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RegistryError::from_response_body(status.as_u16(), &body));
            }

            let mut page: ListPage = response.json().await?;
            if let Some(value) = page.items.remove(field) {
                let decoded: Vec<T> = serde_json::from_value(value)
                    .map_err(|e| RegistryError::Decode(format!("{}: {}", field, e)))?;
                items.extend(decoded);
            }

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl RegistryBackend for ArtifactRegistryClient {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn list_repositories(&self, location: &str) -> Result<Vec<Repository>, RegistryError> {
        let parent = ResourcePath::location(&self.project_id, location);
        self.list_all(&parent, "repositories", "repositories", &[])
            .await
    }

    async fn list_packages(
        &self,
        location: &str,
        repository: &str,
    ) -> Result<Vec<Package>, RegistryError> {
        let parent = ResourcePath::repository(&self.project_id, location, repository);
        self.list_all(&parent, "packages", "packages", &[]).await
    }

    async fn list_versions(
        &self,
        location: &str,
        repository: &str,
        package: &str,
    ) -> Result<Vec<Version>, RegistryError> {
        let parent = ResourcePath::package(&self.project_id, location, repository, package);
        // FULL view is needed for the metadata map
        self.list_all(&parent, "versions", "versions", &[("view", "FULL")])
            .await
    }

    async fn list_docker_images(
        &self,
        location: &str,
        repository: &str,
    ) -> Result<Vec<DockerImage>, RegistryError> {
        let parent = ResourcePath::repository(&self.project_id, location, repository);
        self.list_all(&parent, "dockerImages", "dockerImages", &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::auth::StaticTokenProvider;
    use crate::registry::UpstreamCode;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ArtifactRegistryClient {
        ArtifactRegistryClient::new(
            Client::new(),
            &server.uri(),
            2,
            "proj1",
            Arc::new(StaticTokenProvider("test-token".to_string())),
        )
    }

    #[tokio::test]
    async fn test_list_repositories_follows_page_tokens() {
        let server = MockServer::start().await;
        let base = "/projects/proj1/locations/us-central1/repositories";

        Mock::given(method("GET"))
            .and(path(base))
            .and(header("authorization", "Bearer test-token"))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "repositories": [
                    {"name": "projects/proj1/locations/us-central1/repositories/a", "format": "DOCKER"},
                    {"name": "projects/proj1/locations/us-central1/repositories/b", "format": "NPM"}
                ],
                "nextPageToken": "page-2"
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(base))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "repositories": [
                    {"name": "projects/proj1/locations/us-central1/repositories/c"}
                ]
            })))
            .mount(&server)
            .await;

        let repos = client(&server)
            .list_repositories("us-central1")
            .await
            .unwrap();
        let names: Vec<_> = repos.iter().map(|r| r.name.rsplit('/').next().unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_empty_location_returns_no_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/proj1/locations/us/repositories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let repos = client(&server).list_repositories("us").await.unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_carries_code_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/proj1/locations/us/repositories/my-repo/packages"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {
                    "code": 403,
                    "message": "Permission 'artifactregistry.packages.list' denied",
                    "status": "PERMISSION_DENIED"
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .list_packages("us", "my-repo")
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(UpstreamCode::PermissionDenied));
        assert!(err.to_string().contains("artifactregistry.packages.list"));
        match err {
            RegistryError::Upstream { http_status, .. } => assert_eq!(http_status, Some(403)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_versions_requests_full_view_with_escaped_package() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/projects/proj1/locations/us/repositories/my-repo/packages/team%2Fapp/versions",
            ))
            .and(query_param("view", "FULL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "versions": [{
                    "name": "projects/proj1/locations/us/repositories/my-repo/packages/team%2Fapp/versions/sha256:abc",
                    "metadata": {"imageSizeBytes": "42"}
                }]
            })))
            .mount(&server)
            .await;

        let versions = client(&server)
            .list_versions("us", "my-repo", "team/app")
            .await
            .unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].metadata["imageSizeBytes"], json!("42"));
    }

    #[tokio::test]
    async fn test_list_docker_images_decodes_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/proj1/locations/us/repositories/my-repo/dockerImages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dockerImages": [{
                    "name": "projects/proj1/locations/us/repositories/my-repo/dockerImages/nginx@sha256:abc",
                    "uri": "us-docker.pkg.dev/proj1/my-repo/nginx@sha256:abc",
                    "tags": ["latest"],
                    "imageSizeBytes": "1048576",
                    "uploadTime": "2024-05-01T12:00:00Z",
                    "mediaType": "application/vnd.docker.distribution.manifest.v2+json"
                }]
            })))
            .mount(&server)
            .await;

        let images = client(&server)
            .list_docker_images("us", "my-repo")
            .await
            .unwrap();
        assert_eq!(images[0].tags, vec!["latest"]);
        assert_eq!(images[0].image_size_bytes, Some(1_048_576));
        assert!(images[0].upload_time.is_some());
    }
}
