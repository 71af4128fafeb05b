use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical status codes reported by the registry API in `error.status`.
///
/// Only the codes the application reacts to are named; everything else
/// collapses into `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpstreamCode {
    Unauthenticated,
    PermissionDenied,
    InvalidArgument,
    NotFound,
    ResourceExhausted,
    Unavailable,
    #[serde(other)]
    Unknown,
}

impl UpstreamCode {
    /// Classify an upstream response, preferring the textual status and
    /// falling back to the HTTP status code.
    pub fn classify(status: Option<&str>, http_status: u16) -> Self {
        match status {
            Some("UNAUTHENTICATED") => Self::Unauthenticated,
            Some("PERMISSION_DENIED") => Self::PermissionDenied,
            Some("INVALID_ARGUMENT") => Self::InvalidArgument,
            Some("NOT_FOUND") => Self::NotFound,
            Some("RESOURCE_EXHAUSTED") => Self::ResourceExhausted,
            Some("UNAVAILABLE") => Self::Unavailable,
            _ => match http_status {
                400 => Self::InvalidArgument,
                401 => Self::Unauthenticated,
                403 => Self::PermissionDenied,
                404 => Self::NotFound,
                429 => Self::ResourceExhausted,
                503 => Self::Unavailable,
                _ => Self::Unknown,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::Unavailable => "UNAVAILABLE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for UpstreamCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry API answered with an error payload
    #[error("{message}")]
    Upstream {
        code: UpstreamCode,
        http_status: Option<u16>,
        message: String,
    },

    #[error("Failed to reach registry API: {0}")]
    Network(String),

    #[error("Unexpected response from registry API: {0}")]
    Decode(String),

    /// Every candidate location failed during a repository scan
    #[error("Failed to list repositories in any location: {message}")]
    AllLocationsFailed {
        code: Option<UpstreamCode>,
        message: String,
    },
}

impl RegistryError {
    pub fn upstream(code: UpstreamCode, message: impl Into<String>) -> Self {
        Self::Upstream {
            code,
            http_status: None,
            message: message.into(),
        }
    }

    /// Upstream code carried by this error, if any
    pub fn code(&self) -> Option<UpstreamCode> {
        match self {
            Self::Upstream { code, .. } => Some(*code),
            Self::AllLocationsFailed { code, .. } => *code,
            Self::Network(_) | Self::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl RegistryError {
    /// Build an error from a non-2xx response body
    pub(crate) fn from_response_body(http_status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorEnvelope>(body) {
            Ok(envelope) => Self::Upstream {
                code: UpstreamCode::classify(envelope.error.status.as_deref(), http_status),
                http_status: Some(http_status),
                message: envelope.error.message,
            },
            Err(_) => Self::Upstream {
                code: UpstreamCode::classify(None, http_status),
                http_status: Some(http_status),
                message: if body.trim().is_empty() {
                    format!("Registry API returned status {}", http_status)
                } else {
                    body.trim().to_string()
                },
            },
        }
    }
}
