//! Shell commands for copying a Docker Hub image into Artifact Registry.
//!
//! Nothing here touches the network or the local Docker daemon; the plan is
//! text for the operator to run.

use serde::Deserialize;
use thiserror::Error;

use crate::api::models::{CommandStep, TransferPlan, TransferSummary};
use crate::format::short_name;
use crate::registry::CredentialBundle;

pub const DEFAULT_TAG: &str = "latest";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Inputs for a transfer plan. Empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(default)]
    pub source_image: Option<String>,
    #[serde(default)]
    pub source_tag: Option<String>,
    #[serde(default)]
    pub target_repository: Option<String>,
    #[serde(default)]
    pub target_location: Option<String>,
    #[serde(default)]
    pub target_name: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Registry host serving Docker repositories in `location`
pub fn registry_host(location: &str) -> String {
    format!("{}-docker.pkg.dev", location)
}

/// Build the four-step plan: authenticate, pull, tag, push
pub fn generate_transfer_plan(
    request: &TransferRequest,
    credentials: Option<&CredentialBundle>,
) -> Result<TransferPlan, TransferError> {
    let source_image = non_empty(&request.source_image);
    let target_repository = non_empty(&request.target_repository);
    let target_location = non_empty(&request.target_location);

    let mut missing = Vec::new();
    if source_image.is_none() {
        missing.push("sourceImage");
    }
    if target_repository.is_none() {
        missing.push("targetRepository");
    }
    if target_location.is_none() {
        missing.push("targetLocation");
    }
    if credentials.is_none() {
        missing.push("credentials");
    }

    let (Some(source_image), Some(target_repository), Some(target_location), Some(credentials)) =
        (source_image, target_repository, target_location, credentials)
    else {
        return Err(TransferError::MissingFields(missing));
    };

    let tag = non_empty(&request.source_tag).unwrap_or(DEFAULT_TAG);
    let image_name = non_empty(&request.target_name).unwrap_or_else(|| short_name(source_image));
    let host = registry_host(target_location);

    let source = format!("{}:{}", source_image, tag);
    let target = format!(
        "{}/{}/{}/{}:{}",
        host, credentials.project_id, target_repository, image_name, tag
    );

    let steps = vec![
        CommandStep {
            step: 1,
            title: "Authenticate Docker with Artifact Registry".to_string(),
            command: format!("gcloud auth configure-docker {}", host),
            description: format!(
                "Registers gcloud as the Docker credential helper for {}",
                host
            ),
        },
        CommandStep {
            step: 2,
            title: "Pull the source image".to_string(),
            command: format!("docker pull {}", source),
            description: format!("Downloads {} from Docker Hub", source),
        },
        CommandStep {
            step: 3,
            title: "Tag the image for Artifact Registry".to_string(),
            command: format!("docker tag {} {}", source, target),
            description: format!("Adds the destination reference {} to the pulled image", target),
        },
        CommandStep {
            step: 4,
            title: "Push the image".to_string(),
            command: format!("docker push {}", target),
            description: format!("Uploads the image to repository {}", target_repository),
        },
    ];

    Ok(TransferPlan {
        steps,
        summary: TransferSummary { source, target },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> CredentialBundle {
        CredentialBundle {
            project_id: "proj1".to_string(),
            client_email: "browser@proj1.iam.gserviceaccount.com".to_string(),
            private_key: "key".to_string(),
            private_key_id: None,
        }
    }

    fn request() -> TransferRequest {
        TransferRequest {
            source_image: Some("nginx".to_string()),
            target_repository: Some("my-repo".to_string()),
            target_location: Some("us-central1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_produce_expected_commands() {
        let plan = generate_transfer_plan(&request(), Some(&credentials())).unwrap();

        assert_eq!(
            plan.summary.target,
            "us-central1-docker.pkg.dev/proj1/my-repo/nginx:latest"
        );
        assert_eq!(plan.summary.source, "nginx:latest");

        let commands: Vec<&str> = plan.steps.iter().map(|s| s.command.as_str()).collect();
        assert_eq!(
            commands,
            vec![
                "gcloud auth configure-docker us-central1-docker.pkg.dev",
                "docker pull nginx:latest",
                "docker tag nginx:latest us-central1-docker.pkg.dev/proj1/my-repo/nginx:latest",
                "docker push us-central1-docker.pkg.dev/proj1/my-repo/nginx:latest",
            ]
        );
    }

    #[test]
    fn test_plan_has_four_ordered_steps_and_is_deterministic() {
        let first = generate_transfer_plan(&request(), Some(&credentials())).unwrap();
        let second = generate_transfer_plan(&request(), Some(&credentials())).unwrap();
        assert_eq!(first, second);

        let numbers: Vec<u8> = first.steps.iter().map(|s| s.step).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert!(first.steps[0].command.starts_with("gcloud auth"));
        assert!(first.steps[1].command.starts_with("docker pull"));
        assert!(first.steps[2].command.starts_with("docker tag"));
        assert!(first.steps[3].command.starts_with("docker push"));
    }

    #[test]
    fn test_explicit_tag_and_target_name() {
        let request = TransferRequest {
            source_image: Some("bitnami/redis".to_string()),
            source_tag: Some("7.2".to_string()),
            target_name: Some("cache".to_string()),
            target_location: Some("europe-west1".to_string()),
            ..request()
        };
        let plan = generate_transfer_plan(&request, Some(&credentials())).unwrap();
        assert_eq!(plan.steps[1].command, "docker pull bitnami/redis:7.2");
        assert_eq!(
            plan.summary.target,
            "europe-west1-docker.pkg.dev/proj1/my-repo/cache:7.2"
        );
    }

    #[test]
    fn test_image_name_defaults_to_last_source_segment() {
        let request = TransferRequest {
            source_image: Some("bitnami/redis".to_string()),
            ..request()
        };
        let plan = generate_transfer_plan(&request, Some(&credentials())).unwrap();
        assert!(plan.summary.target.ends_with("/my-repo/redis:latest"));
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let err = generate_transfer_plan(&TransferRequest::default(), None).unwrap_err();
        assert_eq!(
            err,
            TransferError::MissingFields(vec![
                "sourceImage",
                "targetRepository",
                "targetLocation",
                "credentials"
            ])
        );

        let blank = TransferRequest {
            target_location: Some("  ".to_string()),
            ..request()
        };
        let err = generate_transfer_plan(&blank, Some(&credentials())).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field(s): targetLocation");
    }

    #[test]
    fn test_script_joins_commands() {
        let plan = generate_transfer_plan(&request(), Some(&credentials())).unwrap();
        let script = plan.script();
        assert!(script.starts_with("gcloud auth configure-docker"));
        assert_eq!(script.matches(" && ").count(), 3);
    }
}
