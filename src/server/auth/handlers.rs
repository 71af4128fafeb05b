use axum::{extract::State, Json};

use super::{require_credentials, CredentialsBody};
use crate::api::models::AccountInfo;
use crate::registry::validator::{validate_credentials, ValidationOutcome};
use crate::server::error::ServerError;
use crate::server::state::AppState;

/// Validate a credential value.
///
/// Always answers 200; invalid credentials are reported in the body so the
/// login screen can show the reason.
pub async fn validate(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Json<ValidationOutcome> {
    let outcome = validate_credentials(
        body.credentials,
        state.connector.as_ref(),
        &state.probe_policy,
    )
    .await;

    if outcome.valid {
        tracing::info!(
            project = outcome.project_id.as_deref().unwrap_or_default(),
            limited = outcome.warning.is_some(),
            "Credentials validated"
        );
    } else {
        tracing::info!(
            error = outcome.error.as_deref().unwrap_or_default(),
            "Credentials rejected"
        );
    }

    Json(outcome)
}

/// Project and service account named by the credential value
pub async fn account(Json(body): Json<CredentialsBody>) -> Result<Json<AccountInfo>, ServerError> {
    let bundle = require_credentials(body.credentials)?;

    Ok(Json(AccountInfo {
        project_id: bundle.project_id,
        service_account: bundle.client_email,
    }))
}
