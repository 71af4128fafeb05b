//! Docker Hub search and tag listing.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::api::models::{PopularImage, PublicIndexEntry, PublicTagEntry};
use crate::format::{human_size, iso_timestamp};

pub const DEFAULT_BASE_URL: &str = "https://hub.docker.com/v2";
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Namespace callers use for official images (`hub.docker.com/_/nginx`)
pub const OFFICIAL_NAMESPACE_PLACEHOLDER: &str = "_";
/// Namespace Docker Hub actually stores official images under
pub const OFFICIAL_NAMESPACE: &str = "library";

#[derive(Debug, Error)]
pub enum HubError {
    #[error("Search query is required")]
    EmptyQuery,

    #[error("Repository name is required")]
    MissingRepository,

    #[error("Failed to reach Docker Hub: {0}")]
    Unreachable(String),
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        HubError::Unreachable(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    results: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    repo_name: String,
    #[serde(default)]
    short_description: Option<String>,
    #[serde(default)]
    star_count: u64,
    #[serde(default)]
    pull_count: u64,
    #[serde(default)]
    is_official: bool,
    #[serde(default)]
    is_automated: bool,
}

impl From<SearchItem> for PublicIndexEntry {
    fn from(item: SearchItem) -> Self {
        Self {
            name: item.repo_name,
            description: item.short_description.unwrap_or_default(),
            star_count: item.star_count,
            pull_count: item.pull_count,
            is_official: item.is_official,
            is_automated: item.is_automated,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TagPayload {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    results: Vec<TagItem>,
}

/// Raw tag as returned by Docker Hub
#[derive(Debug, Clone, Deserialize)]
pub struct TagItem {
    pub name: String,
    #[serde(default)]
    pub full_size: Option<u64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub digest: Option<String>,
}

impl From<&TagItem> for PublicTagEntry {
    fn from(tag: &TagItem) -> Self {
        let size_bytes = tag.full_size.unwrap_or(0);
        Self {
            name: tag.name.clone(),
            size_bytes,
            size: human_size(size_bytes),
            last_updated: iso_timestamp(tag.last_updated),
            digest: tag.digest.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchPage {
    pub results: Vec<PublicIndexEntry>,
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone)]
pub struct TagPage {
    pub tags: Vec<TagItem>,
    pub count: u64,
    pub page: u32,
}

impl TagPage {
    pub fn entries(&self) -> Vec<PublicTagEntry> {
        self.tags.iter().map(PublicTagEntry::from).collect()
    }
}

/// Unauthenticated Docker Hub client
#[derive(Clone)]
pub struct HubClient {
    http_client: Client,
    base_url: String,
    default_page_size: u32,
}

impl HubClient {
    pub fn new(http_client: Client, base_url: &str, default_page_size: u32) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_page_size,
        }
    }

    pub async fn search(
        &self,
        query: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<SearchPage, HubError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(HubError::EmptyQuery);
        }

        let page = page.unwrap_or(1).max(1);
        let page_size = page_size.unwrap_or(self.default_page_size).max(1);
        let url = format!("{}/search/repositories/", self.base_url);

        tracing::debug!(query = %query, page, page_size, "Searching Docker Hub");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", query.to_string()),
                ("page", page.to_string()),
                ("page_size", page_size.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Unreachable(format!(
                "search returned status {}",
                status
            )));
        }

        let payload: SearchPayload = response.json().await?;
        let results: Vec<PublicIndexEntry> =
            payload.results.into_iter().map(Into::into).collect();

        Ok(SearchPage {
            count: payload.count.unwrap_or(results.len() as u64),
            results,
            page,
            page_size,
        })
    }

    pub async fn list_tags(
        &self,
        namespace: &str,
        repository: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<TagPage, HubError> {
        if repository.trim().is_empty() {
            return Err(HubError::MissingRepository);
        }

        let namespace = match namespace.trim() {
            "" | OFFICIAL_NAMESPACE_PLACEHOLDER => OFFICIAL_NAMESPACE,
            other => other,
        };
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size.unwrap_or(self.default_page_size).max(1);
        let url = format!(
            "{}/repositories/{}/{}/tags",
            self.base_url,
            urlencoding::encode(namespace),
            urlencoding::encode(repository.trim())
        );

        tracing::debug!(namespace = %namespace, repository = %repository, page, "Listing Docker Hub tags");

        let response = self
            .http_client
            .get(&url)
            .query(&[("page", page.to_string()), ("page_size", page_size.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Unreachable(format!(
                "tag listing returned status {}",
                status
            )));
        }

        let payload: TagPayload = response.json().await?;
        Ok(TagPage {
            count: payload.count.unwrap_or(payload.results.len() as u64),
            tags: payload.results,
            page,
        })
    }
}

/// Split `nginx` or `bitnami/redis` into namespace and repository
pub fn split_image_name(image: &str) -> (&str, &str) {
    match image.trim().split_once('/') {
        Some((namespace, repository)) => (namespace, repository),
        None => (OFFICIAL_NAMESPACE_PLACEHOLDER, image.trim()),
    }
}

const POPULAR_IMAGES: &[(&str, &str, &str)] = &[
    ("nginx", "High-performance HTTP server and reverse proxy", "Web Server"),
    ("httpd", "The Apache HTTP Server", "Web Server"),
    ("traefik", "Cloud native edge router", "Web Server"),
    ("postgres", "Object-relational database system", "Database"),
    ("mysql", "Widely used open-source relational database", "Database"),
    ("mongo", "Document-oriented NoSQL database", "Database"),
    ("redis", "In-memory key-value data store", "Database"),
    ("rabbitmq", "Message broker implementing AMQP", "Messaging"),
    ("node", "JavaScript runtime built on V8", "Runtime"),
    ("python", "Python programming language runtime", "Runtime"),
    ("golang", "Go programming language toolchain", "Runtime"),
    ("openjdk", "Open-source Java Platform, Standard Edition", "Runtime"),
    ("alpine", "Minimal Docker image based on Alpine Linux", "Base Image"),
    ("ubuntu", "Ubuntu Linux base image", "Base Image"),
    ("debian", "Debian Linux base image", "Base Image"),
    ("busybox", "Tiny image bundling common UNIX utilities", "Base Image"),
];

/// Curated list shown before the operator searches
pub fn popular_images() -> Vec<PopularImage> {
    POPULAR_IMAGES
        .iter()
        .map(|(name, description, category)| PopularImage {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HubClient {
        HubClient::new(Client::new(), &server.uri(), DEFAULT_PAGE_SIZE)
    }

    #[tokio::test]
    async fn test_search_maps_results_and_defaults_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/repositories/"))
            .and(query_param("query", "nginx"))
            .and(query_param("page", "1"))
            .and(query_param("page_size", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1200,
                "results": [{
                    "repo_name": "nginx",
                    "short_description": "Official build of Nginx.",
                    "star_count": 20000,
                    "pull_count": 1000000000u64,
                    "is_official": true,
                    "is_automated": false
                }]
            })))
            .mount(&server)
            .await;

        let page = client(&server).search("nginx", None, None).await.unwrap();
        assert_eq!(page.count, 1200);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 25);
        assert_eq!(page.results[0].name, "nginx");
        assert!(page.results[0].is_official);
        assert_eq!(page.results[0].star_count, 20000);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server).search("   ", None, None).await.unwrap_err();
        assert!(matches!(err, HubError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_placeholder_namespace_is_rewritten() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repositories/library/nginx/tags"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "results": [
                    {"name": "latest", "full_size": 1536, "last_updated": "2024-05-01T12:00:00.000000Z", "digest": "sha256:abc"},
                    {"name": "1.25"}
                ]
            })))
            .mount(&server)
            .await;

        let page = client(&server)
            .list_tags("_", "nginx", Some(2), None)
            .await
            .unwrap();
        let entries = page.entries();
        assert_eq!(page.count, 2);
        assert_eq!(entries[0].size, "1.50 KB");
        assert_eq!(entries[0].last_updated.as_deref(), Some("2024-05-01T12:00:00.000Z"));
        assert_eq!(entries[1].size_bytes, 0);
        assert_eq!(entries[1].size, "0 Bytes");
        assert_eq!(entries[1].digest, None);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_reported_as_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server).search("redis", None, None).await.unwrap_err();
        assert!(matches!(err, HubError::Unreachable(_)));
        assert!(err.to_string().starts_with("Failed to reach Docker Hub"));
    }

    #[test]
    fn test_split_image_name() {
        assert_eq!(split_image_name("nginx"), ("_", "nginx"));
        assert_eq!(split_image_name("bitnami/redis"), ("bitnami", "redis"));
    }

    #[test]
    fn test_popular_images_are_categorised() {
        let images = popular_images();
        assert!(images.iter().any(|i| i.name == "nginx" && i.category == "Web Server"));
        assert!(images.iter().all(|i| !i.description.is_empty()));
    }
}
