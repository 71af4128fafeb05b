//! Listing formatters: raw upstream records to display records.
//!
//! The web API and the CLI intentionally render missing values differently:
//! the API reports an absent size as `0` / `"0 Bytes"` and an absent
//! timestamp as `null`, the CLI prints `"N/A"` for both.

use chrono::{DateTime, Local, SecondsFormat, Utc};

use crate::api::models::{DockerImageRecord, PackageRecord, RepositoryRecord, VersionRecord};
use crate::registry::models::{DockerImage, Package, Repository, Version};

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Placeholder the CLI prints for absent values
pub const NOT_AVAILABLE: &str = "N/A";

/// Positional segments of `projects/{p}/locations/{l}/repositories/{r}/...`
const LOCATION_SEGMENT: usize = 3;
const REPOSITORY_SEGMENT: usize = 5;

/// Final segment of a resource name
pub fn short_name(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

fn segment(id: &str, index: usize) -> Option<&str> {
    id.split('/').nth(index)
}

/// Location code embedded in a resource name
pub fn location_of(id: &str) -> &str {
    segment(id, LOCATION_SEGMENT).unwrap_or("")
}

/// Repository id embedded in a resource name
pub fn repository_of(id: &str) -> &str {
    segment(id, REPOSITORY_SEGMENT).unwrap_or_else(|| short_name(id))
}

/// Last two path segments joined, e.g. `dockerImages/nginx@sha256:...`
pub fn composite_name(id: &str) -> String {
    let parts: Vec<&str> = id.split('/').collect();
    let start = parts.len().saturating_sub(2);
    parts[start..].join("/")
}

/// Human readable byte count with two decimals, `0 Bytes` for zero
pub fn human_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    while unit < SIZE_UNITS.len() - 1 && bytes >= 1024u64.pow(unit as u32 + 1) {
        unit += 1;
    }

    let value = bytes as f64 / 1024f64.powi(unit as i32);
    format!("{:.2} {}", value, SIZE_UNITS[unit])
}

/// CLI variant of [`human_size`]
pub fn human_size_or_na(bytes: Option<u64>) -> String {
    bytes.map(human_size).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// ISO-8601 with millisecond precision and a `Z` suffix
pub fn iso_timestamp(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Local time for terminal output
pub fn local_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| {
        t.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    })
    .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn repository_record(repo: &Repository) -> RepositoryRecord {
    let size_bytes = repo.size_bytes.unwrap_or(0);
    RepositoryRecord {
        id: repo.name.clone(),
        name: repository_of(&repo.name).to_string(),
        location: location_of(&repo.name).to_string(),
        format: repo.format,
        description: repo.description.clone().unwrap_or_default(),
        create_time: iso_timestamp(repo.create_time),
        update_time: iso_timestamp(repo.update_time),
        size_bytes,
        size: human_size(size_bytes),
    }
}

pub fn package_record(package: &Package) -> PackageRecord {
    let name = short_name(&package.name).to_string();
    PackageRecord {
        id: package.name.clone(),
        display_name: package
            .display_name
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| name.clone()),
        name,
        create_time: iso_timestamp(package.create_time),
        update_time: iso_timestamp(package.update_time),
    }
}

pub fn version_record(version: &Version) -> VersionRecord {
    VersionRecord {
        id: version.name.clone(),
        name: short_name(&version.name).to_string(),
        description: version.description.clone().unwrap_or_default(),
        create_time: iso_timestamp(version.create_time),
        update_time: iso_timestamp(version.update_time),
        metadata: version.metadata.clone(),
    }
}

pub fn docker_image_record(image: &DockerImage) -> DockerImageRecord {
    let size_bytes = image.image_size_bytes.unwrap_or(0);
    DockerImageRecord {
        id: image.name.clone(),
        name: composite_name(&image.name),
        uri: image.uri.clone(),
        tags: image.tags.clone(),
        size_bytes,
        size: human_size(size_bytes),
        upload_time: iso_timestamp(image.upload_time),
        build_time: iso_timestamp(image.build_time),
        update_time: iso_timestamp(image.update_time),
        media_type: image.media_type.clone(),
    }
}

/// Comma separated tags, `untagged` when there are none
pub fn tag_list(tags: &[String]) -> String {
    if tags.is_empty() {
        "untagged".to_string()
    } else {
        tags.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::models::RepositoryFormat;
    use chrono::TimeZone;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 Bytes");
        assert_eq!(human_size(1), "1.00 Bytes");
        assert_eq!(human_size(1023), "1023.00 Bytes");
        assert_eq!(human_size(1024), "1.00 KB");
        assert_eq!(human_size(1536), "1.50 KB");
        assert_eq!(human_size(1024 * 1024), "1.00 MB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.00 GB");
        assert_eq!(human_size(1024u64.pow(4)), "1.00 TB");
    }

    #[test]
    fn test_human_size_caps_at_terabytes() {
        assert_eq!(human_size(1024u64.pow(5)), "1024.00 TB");
    }

    #[test]
    fn test_displayed_magnitude_stays_below_next_unit() {
        for bytes in [1u64, 999, 1025, 70_000, 3_000_000, 9_999_999_999] {
            let rendered = human_size(bytes);
            let magnitude: f64 = rendered.split(' ').next().unwrap().parse().unwrap();
            assert!(magnitude >= 1.0, "{}", rendered);
            assert!(magnitude < 1024.0, "{}", rendered);
        }
    }

    #[test]
    fn test_missing_values_differ_between_front_ends() {
        assert_eq!(human_size_or_na(None), "N/A");
        assert_eq!(human_size_or_na(Some(1536)), "1.50 KB");
        assert_eq!(local_timestamp(None), "N/A");
        assert_eq!(iso_timestamp(None), None);

        let record = repository_record(&Repository {
            name: "projects/p/locations/us/repositories/r".to_string(),
            ..Default::default()
        });
        assert_eq!(record.size_bytes, 0);
        assert_eq!(record.size, "0 Bytes");
        assert_eq!(record.create_time, None);
    }

    #[test]
    fn test_short_name_is_invariant_under_prefix_length() {
        assert_eq!(short_name("segment"), "segment");
        assert_eq!(short_name("a/segment"), "segment");
        assert_eq!(short_name("projects/p/locations/l/repositories/r/packages/segment"), "segment");
    }

    #[test]
    fn test_iso_timestamp_matches_javascript_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(
            iso_timestamp(Some(ts)).as_deref(),
            Some("2024-03-01T10:00:00.000Z")
        );
    }

    #[test]
    fn test_repository_record_round_trip() {
        let repo = Repository {
            name: "projects/proj1/locations/europe-west1/repositories/my-repo".to_string(),
            format: RepositoryFormat::Docker,
            description: Some("images".to_string()),
            size_bytes: Some(1536),
            ..Default::default()
        };
        let record = repository_record(&repo);
        assert_eq!(record.name, "my-repo");
        assert_eq!(record.location, "europe-west1");
        assert_eq!(record.size, "1.50 KB");
        assert_eq!(repository_of(&record.id), record.name);
        assert_eq!(location_of(&record.id), record.location);
    }

    #[test]
    fn test_package_display_name_falls_back_to_short_name() {
        let package = Package {
            name: "projects/p/locations/us/repositories/r/packages/nginx".to_string(),
            display_name: None,
            ..Default::default()
        };
        let record = package_record(&package);
        assert_eq!(record.name, "nginx");
        assert_eq!(record.display_name, "nginx");

        let named = package_record(&Package {
            display_name: Some("Nginx proxy".to_string()),
            ..package
        });
        assert_eq!(named.display_name, "Nginx proxy");
    }

    #[test]
    fn test_docker_image_composite_name() {
        let image = DockerImage {
            name: "projects/p/locations/us/repositories/r/dockerImages/nginx@sha256:abc"
                .to_string(),
            ..Default::default()
        };
        let record = docker_image_record(&image);
        assert_eq!(record.name, "dockerImages/nginx@sha256:abc");
        assert!(record.tags.is_empty());
        assert_eq!(tag_list(&record.tags), "untagged");
        assert_eq!(tag_list(&["1.25".to_string(), "latest".to_string()]), "1.25, latest");
    }

    #[test]
    fn test_version_record_keeps_metadata() {
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("mediaType".to_string(), serde_json::json!("application/json"));
        let version = Version {
            name: "projects/p/locations/us/repositories/r/packages/app/versions/1.0.0".to_string(),
            metadata,
            ..Default::default()
        };
        let record = version_record(&version);
        assert_eq!(record.name, "1.0.0");
        assert_eq!(record.description, "");
        assert_eq!(record.metadata["mediaType"], "application/json");
    }
}
