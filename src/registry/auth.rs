use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::OnceCell;

use super::credentials::CredentialBundle;
use super::error::{RegistryError, UpstreamCode};

/// Google OAuth token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth scope required for read access to Artifact Registry
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const ASSERTION_LIFETIME_SECS: u64 = 3600;
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Supplies bearer tokens for registry API calls
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, RegistryError>;
}

/// Provider that always returns the same token
#[cfg(test)]
pub struct StaticTokenProvider(pub String);

#[cfg(test)]
#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, RegistryError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges a signed service account assertion for an access token.
///
/// The token is fetched on first use and reused for the lifetime of the
/// provider, which is scoped to a single request or CLI session. The token
/// endpoint comes from configuration, never from the caller's key file.
pub struct ServiceAccountTokenProvider {
    http_client: Client,
    client_email: String,
    private_key: String,
    private_key_id: Option<String>,
    token_uri: String,
    token: OnceCell<String>,
}

impl ServiceAccountTokenProvider {
    pub fn new(http_client: Client, bundle: &CredentialBundle, token_uri: &str) -> Self {
        Self {
            http_client,
            client_email: bundle.client_email.clone(),
            private_key: bundle.private_key.clone(),
            private_key_id: bundle.private_key_id.clone(),
            token_uri: token_uri.to_string(),
            token: OnceCell::new(),
        }
    }

    fn signed_assertion(&self) -> Result<String, RegistryError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(|e| {
            RegistryError::upstream(
                UpstreamCode::Unauthenticated,
                format!("Service account private key is not a valid RSA key: {}", e),
            )
        })?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| RegistryError::Network(format!("System clock error: {}", e)))?
            .as_secs();

        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        encode(&header, &claims, &key).map_err(|e| {
            RegistryError::upstream(
                UpstreamCode::Unauthenticated,
                format!("Failed to sign service account assertion: {}", e),
            )
        })
    }

    async fn exchange(&self) -> Result<String, RegistryError> {
        let assertion = self.signed_assertion()?;

        tracing::debug!(
            client_email = %self.client_email,
            token_uri = %self.token_uri,
            "Exchanging service account assertion for access token"
        );

        let response = self
            .http_client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => body,
            };
            return Err(RegistryError::Upstream {
                code: UpstreamCode::Unauthenticated,
                http_status: Some(status.as_u16()),
                message: format!("Token exchange rejected: {}", message),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String, RegistryError> {
        self.token
            .get_or_try_init(|| self.exchange())
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::TEST_RSA_KEY;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bundle(private_key: &str) -> CredentialBundle {
        CredentialBundle {
            project_id: "proj1".to_string(),
            client_email: "browser@proj1.iam.gserviceaccount.com".to_string(),
            private_key: private_key.to_string(),
            private_key_id: Some("abc123".to_string()),
        }
    }

    #[tokio::test]
    async fn test_invalid_private_key_is_unauthenticated_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = ServiceAccountTokenProvider::new(
            Client::new(),
            &bundle("not a pem key"),
            &format!("{}/token", server.uri()),
        );
        let err = provider.access_token().await.unwrap_err();
        assert_eq!(err.code(), Some(UpstreamCode::Unauthenticated));
    }

    #[tokio::test]
    async fn test_signed_assertion_is_exchanged_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains(
                "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
            ))
            .and(body_string_contains("assertion=ey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.exchanged",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = ServiceAccountTokenProvider::new(
            Client::new(),
            &bundle(TEST_RSA_KEY),
            &format!("{}/token", server.uri()),
        );

        assert_eq!(provider.access_token().await.unwrap(), "ya29.exchanged");
        assert_eq!(provider.access_token().await.unwrap(), "ya29.exchanged");
    }

    #[tokio::test]
    async fn test_rejected_exchange_is_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid JWT Signature."
                })),
            )
            .mount(&server)
            .await;

        let provider = ServiceAccountTokenProvider::new(
            Client::new(),
            &bundle(TEST_RSA_KEY),
            &format!("{}/token", server.uri()),
        );
        let err = provider.access_token().await.unwrap_err();

        assert_eq!(err.code(), Some(UpstreamCode::Unauthenticated));
        match err {
            RegistryError::Upstream {
                http_status,
                message,
                ..
            } => {
                assert_eq!(http_status, Some(400));
                assert!(message.contains("Invalid JWT Signature."));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_static_provider_returns_token() {
        let provider = StaticTokenProvider("ya29.token".to_string());
        assert_eq!(provider.access_token().await.unwrap(), "ya29.token");
    }
}
