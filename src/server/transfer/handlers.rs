use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::models::TransferPlanResponse;
use crate::registry::credentials::resolve_optional;
use crate::registry::CredentialError;
use crate::server::error::ServerError;
use crate::transfer::{generate_transfer_plan, TransferRequest};

#[derive(Debug, Deserialize)]
pub struct TransferPlanBody {
    #[serde(flatten)]
    pub request: TransferRequest,
    #[serde(default)]
    pub credentials: Option<Value>,
}

/// Generate the pull/tag/push commands for copying a public image.
///
/// Absent credentials are reported together with the other missing fields;
/// credentials that are present but broken are rejected on their own.
pub async fn plan(Json(body): Json<TransferPlanBody>) -> Result<Json<TransferPlanResponse>, ServerError> {
    let bundle = match resolve_optional(body.credentials) {
        Ok(bundle) => Some(bundle),
        Err(CredentialError::Missing) => None,
        Err(e) => return Err(e.into()),
    };

    let plan = generate_transfer_plan(&body.request, bundle.as_ref())?;

    tracing::debug!(
        source = %plan.summary.source,
        target = %plan.summary.target,
        "Generated transfer plan"
    );

    Ok(Json(plan.into()))
}
