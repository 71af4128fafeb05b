use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::hub::HubError;
use crate::registry::{CredentialError, RegistryError, UpstreamCode};
use crate::transfer::TransferError;

/// Server error type that provides automatic logging and clean error responses.
///
/// Server errors (5xx) are logged with their full source chain when converted
/// into a response. Clients only ever see `message` and, for errors that came
/// from the registry API, the upstream status code.
///
/// # Example
///
/// ```rust,ignore
/// use crate::server::error::ServerError;
///
/// let err = ServerError::bad_request("location and repository are required");
///
/// let err = ServerError::from(registry_error).with_context("location", "us-central1");
/// ```
#[derive(Debug)]
pub struct ServerError {
    /// HTTP status code to return
    pub status: StatusCode,
    /// User-facing error message (returned in response)
    pub message: String,
    /// Upstream status code (returned in response when present)
    pub code: Option<UpstreamCode>,
    /// Internal error with full chain (logged but not exposed to client)
    pub source: Option<anyhow::Error>,
    /// Structured context for logging (key-value pairs)
    pub context: Vec<(&'static str, String)>,
}

impl ServerError {
    /// Create a new error with just status and message (no source error)
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            source: None,
            context: Vec::new(),
        }
    }

    /// Create an error from an anyhow::Error with full error chain
    pub fn from_anyhow(
        source: anyhow::Error,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            source: Some(source),
            context: Vec::new(),
        }
    }

    /// Add a context field for logging (chainable)
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Create a 500 Internal Server Error from an anyhow::Error
    pub fn internal_anyhow(source: anyhow::Error, message: impl Into<String>) -> Self {
        Self::from_anyhow(source, StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        // Log server errors (5xx) with full context using structured fields
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = self.status.as_u16(),
                    message = %self.message,
                    code = ?self.code,
                    context = ?self.context,
                    error = ?source,
                    "Server error"
                );
            } else {
                tracing::error!(
                    status = self.status.as_u16(),
                    message = %self.message,
                    code = ?self.code,
                    context = ?self.context,
                    "Server error"
                );
            }
        }

        let body = match self.code {
            Some(code) => json!({ "error": self.message, "code": code }),
            None => json!({ "error": self.message }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_anyhow(err, "Internal server error")
    }
}

impl From<CredentialError> for ServerError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Missing => Self::unauthorized(err.to_string()),
            CredentialError::MalformedJson(_)
            | CredentialError::MissingFields(_)
            | CredentialError::InvalidFields(_) => Self::bad_request(err.to_string()),
        }
    }
}

impl From<RegistryError> for ServerError {
    fn from(err: RegistryError) -> Self {
        let code = err.code();
        let status = match (&err, code) {
            (RegistryError::Network(_), _) | (RegistryError::Decode(_), _) => {
                StatusCode::BAD_GATEWAY
            }
            (_, Some(UpstreamCode::Unauthenticated)) => StatusCode::UNAUTHORIZED,
            (_, Some(UpstreamCode::PermissionDenied)) => StatusCode::FORBIDDEN,
            (_, Some(UpstreamCode::NotFound)) => StatusCode::NOT_FOUND,
            (_, Some(UpstreamCode::InvalidArgument)) => StatusCode::BAD_REQUEST,
            (_, Some(UpstreamCode::ResourceExhausted)) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::BAD_GATEWAY,
        };
        let message = err.to_string();

        Self {
            status,
            message,
            code,
            source: Some(err.into()),
            context: Vec::new(),
        }
    }
}

impl From<HubError> for ServerError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::EmptyQuery | HubError::MissingRepository => {
                Self::bad_request(err.to_string())
            }
            HubError::Unreachable(_) => {
                let message = err.to_string();
                Self::from_anyhow(err.into(), StatusCode::BAD_GATEWAY, message)
            }
        }
    }
}

impl From<TransferError> for ServerError {
    fn from(err: TransferError) -> Self {
        Self::bad_request(err.to_string())
    }
}
