use serde::Deserialize;
use serde_json::Value;

use crate::server::error::ServerError;

/// Body of the package, version and image listing calls
#[derive(Debug, Default, Deserialize)]
pub struct ListingRequest {
    #[serde(default)]
    pub credentials: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    /// Only read by the version listing
    #[serde(default)]
    pub package: Option<String>,
}

impl ListingRequest {
    /// Location and repository, both required
    pub fn scope(&self) -> Result<(&str, &str), ServerError> {
        match (present(&self.location), present(&self.repository)) {
            (Some(location), Some(repository)) => Ok((location, repository)),
            _ => Err(ServerError::bad_request(
                "Location and repository are required",
            )),
        }
    }

    /// Location, repository and package, all required
    pub fn package_scope(&self) -> Result<(&str, &str, &str), ServerError> {
        match (
            present(&self.location),
            present(&self.repository),
            present(&self.package),
        ) {
            (Some(location), Some(repository), Some(package)) => {
                Ok((location, repository, package))
            }
            _ => Err(ServerError::bad_request(
                "Location, repository, and package are required",
            )),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_scope_requires_location_and_repository() {
        let request = ListingRequest {
            location: Some("us-central1".to_string()),
            repository: Some(" ".to_string()),
            ..Default::default()
        };
        let err = request.scope().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let request = ListingRequest {
            repository: Some("my-repo".to_string()),
            ..request
        };
        assert_eq!(request.scope().unwrap(), ("us-central1", "my-repo"));
        assert!(request.package_scope().is_err());
    }
}
