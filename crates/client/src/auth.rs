//! OAuth client-credentials token management
//!
//! Obtains and caches an access token for authenticated API calls. The
//! token cache is the only mutable shared state in the client: concurrent
//! in-flight requests may race a refresh, and both writes are valid tokens,
//! so the race is tolerated (last writer wins) rather than serialized
//! across the network fetch.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::errors::{ClientError, Result};
use crate::http::HttpTransport;

/// Trait for providing bearer access tokens.
///
/// A custom provider configured on the client takes precedence over the
/// built-in client-credentials flow, which allows dependency injection
/// and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token string (without the `Bearer ` prefix)
    async fn access_token(&self) -> Result<String>;
}

/// OAuth 2.0 client-credentials descriptor.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Token endpoint; absolute URL or a path relative to the base URL.
    /// Defaults to `/oauth/token` when absent.
    pub token_url: Option<String>,
}

impl ClientCredentials {
    /// Create a descriptor using the default token endpoint
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into(), token_url: None }
    }

    /// Override the token endpoint
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = Some(token_url.into());
        self
    }
}

/// A cached OAuth access token with its issue time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The access token
    pub access_token: String,
    /// Token type (always "Bearer" for OAuth 2.0)
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    /// When the token was obtained (UTC)
    pub issued_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token issued now
    #[must_use]
    pub fn new(access_token: String, token_type: String, expires_in: i64) -> Self {
        Self { access_token, token_type, expires_in, issued_at: Utc::now() }
    }

    /// A token is valid strictly before `issued_at + expires_in`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.issued_at + chrono::Duration::seconds(self.expires_in)
    }
}

/// Token response from the authorization server (RFC 6749).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: i64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Obtains and caches a client-credentials access token.
pub struct AuthTokenManager {
    credentials: ClientCredentials,
    token_url: Url,
    transport: Arc<dyn HttpTransport>,
    cache: RwLock<Option<AccessToken>>,
}

impl AuthTokenManager {
    /// Create a new token manager.
    ///
    /// # Errors
    /// Returns `ClientError::Config` if the client id or secret is empty.
    pub fn new(
        credentials: ClientCredentials,
        token_url: Url,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
            return Err(ClientError::Config(
                "client credentials require both client_id and client_secret".to_string(),
            ));
        }

        Ok(Self { credentials, token_url, transport, cache: RwLock::new(None) })
    }

    /// Get a valid access token, fetching a new one when the cached token
    /// is expired or absent.
    ///
    /// # Errors
    /// Returns `ClientError::Auth` on a non-success token response.
    pub async fn get_access_token(&self) -> Result<AccessToken> {
        {
            let cached = self.cache.read().await;
            if let Some(token) = cached.as_ref() {
                if token.is_valid() {
                    debug!("using cached access token");
                    return Ok(token.clone());
                }
            }
        }

        // Lock is not held across the fetch; a concurrent refresh is an
        // idempotent overwrite.
        let token = self.fetch_token().await?;
        *self.cache.write().await = Some(token.clone());
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<AccessToken> {
        let basic = BASE64
            .encode(format!("{}:{}", self.credentials.client_id, self.credentials.client_secret));

        debug!(url = %self.token_url, "fetching access token");

        let mut request = reqwest::Request::new(Method::POST, self.token_url.clone());
        let headers = request.headers_mut();
        headers.insert(
            AUTHORIZATION,
            format!("Basic {basic}")
                .parse()
                .map_err(|_| ClientError::Config("client credentials are not valid header data".to_string()))?,
        );
        headers.insert(
            CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(ACCEPT, reqwest::header::HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(reqwest::Body::from("grant_type=client_credentials"));

        let response = self.transport.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Auth(
                status.canonical_reason().unwrap_or("token request failed").to_string(),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Auth(format!("failed to parse token response: {e}")))?;

        Ok(AccessToken::new(token.access_token, token.token_type, token.expires_in))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::ReqwestTransport;

    fn manager_for(server_uri: &str) -> AuthTokenManager {
        let token_url = Url::parse(&format!("{server_uri}/oauth/token")).unwrap();
        AuthTokenManager::new(
            ClientCredentials::new("client", "secret"),
            token_url,
            Arc::new(ReqwestTransport::new().unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn token_validity_window() {
        let valid = AccessToken::new("t".to_string(), "Bearer".to_string(), 3600);
        assert!(valid.is_valid());

        let mut expired = AccessToken::new("t".to_string(), "Bearer".to_string(), 3600);
        expired.issued_at = Utc::now() - chrono::Duration::seconds(3601);
        assert!(!expired.is_valid());
    }

    #[test]
    fn empty_credentials_rejected() {
        let token_url = Url::parse("https://cms.example.com/oauth/token").unwrap();
        let result = AuthTokenManager::new(
            ClientCredentials::new("", "secret"),
            token_url,
            Arc::new(ReqwestTransport::new().unwrap()),
        );
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn fetches_with_basic_auth_and_grant_body() {
        let server = MockServer::start().await;
        let expected_basic = format!("Basic {}", BASE64.encode("client:secret"));

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("Authorization", expected_basic.as_str()))
            .and(body_string("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "token-1",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri());
        let token = manager.get_access_token().await.unwrap();
        assert_eq!(token.access_token, "token-1");
        assert_eq!(token.token_type, "Bearer");
    }

    #[tokio::test]
    async fn valid_token_is_reused_without_refetch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "token-1",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri());
        let first = manager.get_access_token().await.unwrap();
        let second = manager.get_access_token().await.unwrap();
        assert_eq!(first.access_token, second.access_token);
        assert_eq!(first.issued_at, second.issued_at);
    }

    #[tokio::test]
    async fn expired_token_triggers_exactly_one_refetch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "token-2",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri());
        {
            let mut expired = AccessToken::new("stale".to_string(), "Bearer".to_string(), 60);
            expired.issued_at = Utc::now() - chrono::Duration::seconds(61);
            *manager.cache.write().await = Some(expired);
        }

        let token = manager.get_access_token().await.unwrap();
        assert_eq!(token.access_token, "token-2");
    }

    #[tokio::test]
    async fn non_success_token_response_is_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let manager = manager_for(&server.uri());
        let result = manager.get_access_token().await;
        match result {
            Err(ClientError::Auth(msg)) => assert_eq!(msg, "Unauthorized"),
            other => panic!("expected auth error, got {other:?}"),
        }
    }
}
