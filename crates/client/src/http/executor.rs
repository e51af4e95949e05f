//! Request executor
//!
//! Wraps outbound HTTP calls: merges default headers with per-call
//! headers, injects the Authorization header when requested, dispatches
//! through the pluggable transport and classifies non-success responses
//! into error messages. No retries.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Request, Response};
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use quarry_jsonapi::error::{format_errors, ErrorObject};

use crate::auth::AuthTokenManager;
use crate::config::AuthSource;
use crate::errors::{ClientError, Result};
use crate::http::HttpTransport;

/// Per-call request options.
#[derive(Debug, Default)]
pub struct RequestInit {
    method: Method,
    headers: HeaderMap,
    body: Option<String>,
    with_auth: bool,
}

impl RequestInit {
    /// A GET request
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// A POST request
    #[must_use]
    pub fn post() -> Self {
        Self { method: Method::POST, ..Self::default() }
    }

    /// Add a per-call header; overrides the client default for that name
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serialize `value` as the JSON request body.
    ///
    /// # Errors
    /// Returns `ClientError::Request` if serialization fails.
    pub fn json_body<T: Serialize>(mut self, value: &T) -> Result<Self> {
        let body = serde_json::to_string(value)
            .map_err(|e| ClientError::Request(format!("failed to serialize body: {e}")))?;
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body);
        Ok(self)
    }

    /// Request an Authorization header to be resolved and injected
    #[must_use]
    pub fn with_auth(mut self, with_auth: bool) -> Self {
        self.with_auth = with_auth;
        self
    }
}

/// Executes outbound HTTP calls for the client.
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    default_headers: HeaderMap,
    auth: Option<AuthSource>,
    token_manager: Option<Arc<AuthTokenManager>>,
}

impl RequestExecutor {
    /// Create a new executor
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        default_headers: HeaderMap,
        auth: Option<AuthSource>,
        token_manager: Option<Arc<AuthTokenManager>>,
    ) -> Self {
        Self { transport, default_headers, auth, token_manager }
    }

    /// Execute a request and fail on any non-success response, with the
    /// error message classified from the response body.
    ///
    /// # Errors
    /// - `ClientError::JsonApi` when the body carries a JSON:API `errors`
    ///   array
    /// - `ClientError::Request` otherwise
    #[instrument(skip(self, init), fields(url = %url))]
    pub async fn execute(&self, url: Url, init: RequestInit) -> Result<Response> {
        let response = self.dispatch(url, init).await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::classify_failure(response).await)
    }

    /// Execute a request and return the response regardless of status.
    ///
    /// Used where a non-success status is a meaningful outcome (e.g. a
    /// router miss) rather than an error.
    ///
    /// # Errors
    /// Returns `ClientError::Request` on transport failure.
    pub async fn dispatch(&self, url: Url, init: RequestInit) -> Result<Response> {
        let mut headers = self.default_headers.clone();
        for (name, value) in &init.headers {
            headers.insert(name.clone(), value.clone());
        }

        if init.with_auth {
            let value = self.authorization_value().await?;
            headers.insert(
                AUTHORIZATION,
                value.parse().map_err(|_| {
                    ClientError::Config("authorization value is not valid header data".to_string())
                })?,
            );
        }

        debug!(method = %init.method, "sending request");

        let mut request = Request::new(init.method, url);
        *request.headers_mut() = headers;
        if let Some(body) = init.body {
            *request.body_mut() = Some(reqwest::Body::from(body));
        }

        self.transport.execute(request).await
    }

    /// Resolve the Authorization header value. A custom provider takes
    /// precedence over a static header, which takes precedence over the
    /// client-credentials token manager.
    async fn authorization_value(&self) -> Result<String> {
        match &self.auth {
            Some(AuthSource::Provider(provider)) => {
                let token = provider.access_token().await?;
                Ok(format!("Bearer {token}"))
            }
            Some(AuthSource::Header(value)) => Ok(value.clone()),
            Some(AuthSource::ClientCredentials(_)) => {
                let manager = self.token_manager.as_ref().ok_or_else(|| {
                    ClientError::Config("token manager is not initialized".to_string())
                })?;
                let token = manager.get_access_token().await?;
                Ok(format!("Bearer {}", token.access_token))
            }
            None => Err(ClientError::Config(
                "auth was requested but the client has no auth configured".to_string(),
            )),
        }
    }

    /// Classify a non-success response into an error by content type.
    pub(crate) async fn classify_failure(response: Response) -> ClientError {
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("unknown status").to_string();

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .unwrap_or_default()
            .trim()
            .to_string();

        match content_type.as_str() {
            "application/vnd.api+json" => {
                let errors = response
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|body| {
                        serde_json::from_value::<Vec<ErrorObject>>(body.get("errors")?.clone()).ok()
                    })
                    .unwrap_or_default();

                if errors.is_empty() {
                    ClientError::Request(status_text)
                } else {
                    ClientError::JsonApi(format_errors(&errors))
                }
            }
            "application/json" => {
                let message = response
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|body| body.get("message")?.as_str().map(str::to_string));

                ClientError::Request(message.unwrap_or(status_text))
            }
            _ => ClientError::Request(status_text),
        }
    }
}
