use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::registry::models::RepositoryFormat;
use crate::registry::scan::LocationOutcome;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    pub id: String,
    pub name: String,
    pub location: String,
    pub format: RepositoryFormat,
    pub description: String,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub size_bytes: u64,
    pub size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DockerImageRecord {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub tags: Vec<String>,
    pub size_bytes: u64,
    pub size: String,
    pub upload_time: Option<String>,
    pub build_time: Option<String>,
    pub update_time: Option<String>,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIndexEntry {
    pub name: String,
    pub description: String,
    pub star_count: u64,
    pub pull_count: u64,
    pub is_official: bool,
    pub is_automated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicTagEntry {
    pub name: String,
    pub size_bytes: u64,
    pub size: String,
    pub last_updated: Option<String>,
    pub digest: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PopularImage {
    pub name: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommandStep {
    pub step: u8,
    pub title: String,
    pub command: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferSummary {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferPlan {
    pub steps: Vec<CommandStep>,
    pub summary: TransferSummary,
}

impl TransferPlan {
    /// All commands as one shell line, stopping at the first failure
    pub fn script(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.command.as_str())
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub project_id: String,
    pub service_account: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepositoriesResponse {
    pub repositories: Vec<RepositoryRecord>,
    pub count: usize,
    pub locations: Vec<LocationOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesResponse {
    pub packages: Vec<PackageRecord>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsResponse {
    pub versions: Vec<VersionRecord>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerImagesResponse {
    pub images: Vec<DockerImageRecord>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<PublicIndexEntry>,
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsResponse {
    pub tags: Vec<PublicTagEntry>,
    pub count: u64,
    pub page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPlanResponse {
    #[serde(flatten)]
    pub plan: TransferPlan,
    pub script: String,
}

impl From<TransferPlan> for TransferPlanResponse {
    fn from(plan: TransferPlan) -> Self {
        let script = plan.script();
        Self { plan, script }
    }
}
