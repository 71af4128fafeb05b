//! Raw resources as returned by the Artifact Registry v1 REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Repository format as reported upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepositoryFormat {
    Docker,
    Maven,
    Npm,
    Python,
    Apt,
    Yum,
    Go,
    Kfp,
    Generic,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RepositoryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RepositoryFormat::Docker => "DOCKER",
            RepositoryFormat::Maven => "MAVEN",
            RepositoryFormat::Npm => "NPM",
            RepositoryFormat::Python => "PYTHON",
            RepositoryFormat::Apt => "APT",
            RepositoryFormat::Yum => "YUM",
            RepositoryFormat::Go => "GO",
            RepositoryFormat::Kfp => "KFP",
            RepositoryFormat::Generic => "GENERIC",
            RepositoryFormat::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// int64 fields are encoded as JSON strings by Google APIs
fn de_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::Number(n)) => Ok(Some(n)),
        Some(StringOrNumber::String(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub format: RepositoryFormat,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DockerImage {
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub image_size_bytes: Option<u64>,
    #[serde(default)]
    pub upload_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub build_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_decodes_string_encoded_size() {
        let repo: Repository = serde_json::from_str(
            r#"{
                "name": "projects/proj1/locations/us-central1/repositories/my-repo",
                "format": "DOCKER",
                "createTime": "2024-03-01T10:00:00.123456Z",
                "sizeBytes": "1536"
            }"#,
        )
        .unwrap();
        assert_eq!(repo.format, RepositoryFormat::Docker);
        assert_eq!(repo.size_bytes, Some(1536));
        assert!(repo.create_time.is_some());
        assert!(repo.update_time.is_none());
    }

    #[test]
    fn test_unrecognised_format_falls_back_to_unknown() {
        let repo: Repository =
            serde_json::from_str(r#"{"name": "x", "format": "FORMAT_UNSPECIFIED"}"#).unwrap();
        assert_eq!(repo.format, RepositoryFormat::Unknown);
        assert_eq!(repo.format.to_string(), "UNKNOWN");
    }
}
