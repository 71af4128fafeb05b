use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::credentials::{resolve_optional, CredentialBundle};
use super::error::UpstreamCode;
use super::RegistryConnector;

/// How the live probe interprets upstream failures.
///
/// The probe only exists to catch outright bad keys, so anything that is
/// neither a success nor a rejecting code counts as valid.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbePolicy {
    /// Locations tried in order until one answers
    #[serde(default = "default_probe_locations")]
    pub probe_locations: Vec<String>,
    /// Codes meaning "authenticated, but not allowed to list here"
    #[serde(default = "default_limited_access_codes")]
    pub limited_access_codes: Vec<UpstreamCode>,
    /// Codes meaning the key itself was rejected
    #[serde(default = "default_rejecting_codes")]
    pub rejecting_codes: Vec<UpstreamCode>,
}

fn default_probe_locations() -> Vec<String> {
    vec!["us-central1".to_string(), "us".to_string()]
}

fn default_limited_access_codes() -> Vec<UpstreamCode> {
    vec![UpstreamCode::PermissionDenied, UpstreamCode::InvalidArgument]
}

fn default_rejecting_codes() -> Vec<UpstreamCode> {
    vec![UpstreamCode::Unauthenticated]
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            probe_locations: default_probe_locations(),
            limited_access_codes: default_limited_access_codes(),
            rejecting_codes: default_rejecting_codes(),
        }
    }
}

/// Result of validating a credential value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ValidationOutcome {
    fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            project_id: None,
            service_account: None,
            error: Some(error.into()),
            warning: None,
        }
    }

    fn valid(bundle: &CredentialBundle) -> Self {
        Self {
            valid: true,
            project_id: Some(bundle.project_id.clone()),
            service_account: Some(bundle.client_email.clone()),
            error: None,
            warning: None,
        }
    }
}

/// Parse, structurally check and probe a credential value
pub async fn validate_credentials(
    value: Option<Value>,
    connector: &dyn RegistryConnector,
    policy: &ProbePolicy,
) -> ValidationOutcome {
    let bundle = match resolve_optional(value) {
        Ok(bundle) => bundle,
        Err(e) => return ValidationOutcome::invalid(e.to_string()),
    };

    probe(&bundle, connector, policy).await
}

/// Best-effort live check of an already parsed bundle
pub async fn probe(
    bundle: &CredentialBundle,
    connector: &dyn RegistryConnector,
    policy: &ProbePolicy,
) -> ValidationOutcome {
    let backend = connector.connect(bundle);
    let mut last_error = None;

    for location in &policy.probe_locations {
        match backend.list_repositories(location).await {
            Ok(_) => {
                tracing::debug!(
                    project = %bundle.project_id,
                    location = %location,
                    "Credential probe succeeded"
                );
                return ValidationOutcome::valid(bundle);
            }
            Err(err) => {
                tracing::debug!(
                    project = %bundle.project_id,
                    location = %location,
                    error = %err,
                    "Credential probe attempt failed"
                );
                last_error = Some(err);
            }
        }
    }

    let Some(err) = last_error else {
        return ValidationOutcome::valid(bundle);
    };

    match err.code() {
        Some(code) if policy.rejecting_codes.contains(&code) => {
            ValidationOutcome::invalid(format!("Authentication failed: {}", err))
        }
        Some(code) if policy.limited_access_codes.contains(&code) => ValidationOutcome {
            warning: Some(format!(
                "Credentials accepted with limited permissions: {}",
                err
            )),
            ..ValidationOutcome::valid(bundle)
        },
        _ => ValidationOutcome::valid(bundle),
    }
}
