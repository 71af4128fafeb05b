//! Credential validation and account lookup.
//!
//! The backend holds no session: every request carries the service account
//! key it should act with, either as raw JSON text or as an object.

pub mod handlers;
pub mod routes;

use serde::Deserialize;
use serde_json::Value;

use crate::registry::credentials::resolve_optional;
use crate::registry::CredentialBundle;
use crate::server::error::ServerError;

/// Request body carrying nothing but a credential value
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsBody {
    #[serde(default)]
    pub credentials: Option<Value>,
}

/// Normalise the credential value of a request, rejecting it before any
/// upstream call is made
pub fn require_credentials(value: Option<Value>) -> Result<CredentialBundle, ServerError> {
    Ok(resolve_optional(value)?)
}
