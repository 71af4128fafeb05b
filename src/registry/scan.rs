use serde::Serialize;

use super::error::{RegistryError, UpstreamCode};
use super::models::Repository;
use super::RegistryBackend;

/// What happened when one candidate location was queried
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LocationStatus {
    Listed { count: usize },
    Empty,
    Failed {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<UpstreamCode>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationOutcome {
    pub location: String,
    #[serde(flatten)]
    pub status: LocationStatus,
}

/// Repositories found across all candidate locations
#[derive(Debug, Clone, Default)]
pub struct RepositoryScan {
    pub repositories: Vec<Repository>,
    pub outcomes: Vec<LocationOutcome>,
}

impl RepositoryScan {
    pub fn failed_locations(&self) -> impl Iterator<Item = &LocationOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, LocationStatus::Failed { .. }))
    }
}

/// Query each location in order and concatenate the results.
///
/// A failing location is recorded and skipped. `NOT_FOUND` counts as an
/// empty location. The scan only fails when every location failed.
pub async fn scan_repositories(
    backend: &dyn RegistryBackend,
    locations: &[String],
) -> Result<RepositoryScan, RegistryError> {
    let mut scan = RepositoryScan::default();
    let mut first_error: Option<RegistryError> = None;

    for location in locations {
        let status = match backend.list_repositories(location).await {
            Ok(repos) if repos.is_empty() => LocationStatus::Empty,
            Ok(repos) => {
                let count = repos.len();
                scan.repositories.extend(repos);
                LocationStatus::Listed { count }
            }
            Err(err) if err.code() == Some(UpstreamCode::NotFound) => LocationStatus::Empty,
            Err(err) => {
                tracing::warn!(
                    project = %backend.project_id(),
                    location = %location,
                    error = %err,
                    "Skipping location after repository listing failed"
                );
                let status = LocationStatus::Failed {
                    message: err.to_string(),
                    code: err.code(),
                };
                first_error.get_or_insert(err);
                status
            }
        };

        tracing::debug!(location = %location, status = ?status, "Scanned location");
        scan.outcomes.push(LocationOutcome {
            location: location.clone(),
            status,
        });
    }

    let all_failed = !scan.outcomes.is_empty()
        && scan
            .outcomes
            .iter()
            .all(|o| matches!(o.status, LocationStatus::Failed { .. }));

    if all_failed {
        if let Some(err) = first_error {
            return Err(RegistryError::AllLocationsFailed {
                code: err.code(),
                message: err.to_string(),
            });
        }
    }

    Ok(scan)
}
