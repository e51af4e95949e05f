//! The CMS client
//!
//! One client instance holds the base URL, locale/prefix defaults, auth
//! source and token cache; all resolution, fetching and path-generation
//! operations hang off it. Many requests may be in flight on a single
//! instance at once.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use quarry_jsonapi::{ApiParams, DenormalizingDeserializer, Document, DocumentDeserializer};

use crate::auth::{AccessToken, AuthTokenManager};
use crate::config::{AuthSource, ClientConfig};
use crate::errors::{ClientError, Result};
use crate::http::{HttpTransport, ReqwestTransport, RequestExecutor, RequestInit};
use crate::options::RequestOptions;

/// JSON:API content type used for content negotiation defaults
pub const JSONAPI_CONTENT_TYPE: &str = "application/vnd.api+json";

const DEFAULT_API_PREFIX: &str = "/jsonapi";
const DEFAULT_FRONT_PAGE: &str = "/home";
const DEFAULT_TOKEN_PATH: &str = "/oauth/token";

/// Client for a JSON:API-compliant headless CMS backend.
pub struct Client {
    config: ClientConfig,
    executor: RequestExecutor,
    token_manager: Option<Arc<AuthTokenManager>>,
    deserializer: Arc<dyn DocumentDeserializer>,
}

impl Client {
    /// Start building a client
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The immutable client configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Compose an absolute URL.
    ///
    /// A path starting with `/` is appended to the base URL, keeping any
    /// path segment the base URL carries (backends served under a
    /// subdirectory); any other path is treated as already absolute.
    /// Query parameters are appended in bracket/nested notation.
    ///
    /// # Errors
    /// Returns `ClientError::Config` when the path cannot be parsed.
    pub fn build_url(&self, path: &str, params: &ApiParams) -> Result<Url> {
        let mut url = if path.starts_with('/') {
            let base_path = self.config.base_url.path().trim_end_matches('/');
            self.config.base_url.join(&format!("{base_path}{path}"))?
        } else {
            Url::parse(path)?
        };

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.to_query_pairs());
        }

        Ok(url)
    }

    /// The JSON:API entry URL, locale-prefixed when the requested locale
    /// differs from the default.
    pub(crate) fn api_url(&self, options: &RequestOptions, suffix: &str) -> Result<Url> {
        let path = match options.locale_prefix() {
            Some(locale) => format!("/{locale}{}{suffix}", self.config.api_prefix),
            None => format!("{}{suffix}", self.config.api_prefix),
        };
        self.build_url(&path, &ApiParams::new())
    }

    /// A base-relative endpoint outside the JSON:API prefix (router,
    /// subrequests), locale-prefixed the same way.
    pub(crate) fn endpoint_url(&self, options: &RequestOptions, path: &str) -> Result<Url> {
        let path = match options.locale_prefix() {
            Some(locale) => format!("/{locale}{path}"),
            None => path.to_string(),
        };
        self.build_url(&path, &ApiParams::new())
    }

    /// Fetch a URL and parse the body as a compound document.
    pub(crate) async fn fetch_document(&self, url: Url, with_auth: bool) -> Result<Document> {
        let response = self.executor.execute(url, RequestInit::get().with_auth(with_auth)).await?;
        response
            .json::<Document>()
            .await
            .map_err(|e| ClientError::Request(format!("failed to parse response: {e}")))
    }

    /// Apply the configured deserializer, or pass the document through
    /// raw when requested.
    pub(crate) fn deserialize_document(&self, document: &Document, raw: bool) -> Result<Value> {
        if raw {
            return serde_json::to_value(document)
                .map_err(|e| ClientError::Request(format!("failed to serialize document: {e}")));
        }
        Ok(self.deserializer.deserialize(document))
    }

    /// Get a valid client-credentials access token, from cache while it
    /// is unexpired.
    ///
    /// # Errors
    /// - `ClientError::Config` when auth is not configured as client
    ///   credentials
    /// - `ClientError::Auth` on a non-success token response
    pub async fn get_access_token(&self) -> Result<AccessToken> {
        match &self.token_manager {
            Some(manager) => manager.get_access_token().await,
            None => Err(ClientError::Config(
                "auth is not configured with client credentials".to_string(),
            )),
        }
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    base_url: Option<String>,
    api_prefix: String,
    front_page: String,
    default_headers: HeaderMap,
    auth: Option<AuthSource>,
    use_default_entry_point: bool,
    transport: Option<Arc<dyn HttpTransport>>,
    deserializer: Option<Arc<dyn DocumentDeserializer>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSONAPI_CONTENT_TYPE));
        default_headers.insert(ACCEPT, HeaderValue::from_static(JSONAPI_CONTENT_TYPE));

        Self {
            base_url: None,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            front_page: DEFAULT_FRONT_PAGE.to_string(),
            default_headers,
            auth: None,
            use_default_entry_point: false,
            transport: None,
            deserializer: None,
        }
    }
}

impl ClientBuilder {
    /// Set the backend base URL (required)
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the JSON:API path prefix (default `/jsonapi`); normalized to
    /// start with `/`
    #[must_use]
    pub fn api_prefix(mut self, api_prefix: impl Into<String>) -> Self {
        self.api_prefix = api_prefix.into();
        self
    }

    /// Set the front-page path alias (default `/home`)
    #[must_use]
    pub fn front_page(mut self, front_page: impl Into<String>) -> Self {
        self.front_page = front_page.into();
        self
    }

    /// Add a default header sent with every request
    #[must_use]
    pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Configure the auth source
    #[must_use]
    pub fn auth(mut self, auth: AuthSource) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Bypass index discovery and derive entry points from the
    /// `entity--bundle` type split
    #[must_use]
    pub fn use_default_entry_point(mut self, enabled: bool) -> Self {
        self.use_default_entry_point = enabled;
        self
    }

    /// Set a custom network transport
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set a custom document deserializer
    #[must_use]
    pub fn deserializer(mut self, deserializer: Arc<dyn DocumentDeserializer>) -> Self {
        self.deserializer = Some(deserializer);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns `ClientError::Config` when the base URL is missing or
    /// invalid, or when configured credentials are incomplete.
    pub fn build(self) -> Result<Client> {
        let base_url = match self.base_url.as_deref() {
            Some(value) if !value.is_empty() => value.trim_end_matches('/').to_string(),
            _ => return Err(ClientError::Config("base URL is required".to_string())),
        };
        let base_url = Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("base URL is not valid: {e}")))?;

        let mut api_prefix = self.api_prefix.trim_end_matches('/').to_string();
        if !api_prefix.starts_with('/') {
            api_prefix.insert(0, '/');
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        let token_manager = match &self.auth {
            Some(AuthSource::ClientCredentials(credentials)) => {
                let token_url = match credentials.token_url.as_deref() {
                    Some(path) if path.starts_with('/') => base_url.join(path)?,
                    Some(absolute) => Url::parse(absolute)
                        .map_err(|e| ClientError::Config(format!("token URL is not valid: {e}")))?,
                    None => base_url.join(DEFAULT_TOKEN_PATH)?,
                };
                Some(Arc::new(AuthTokenManager::new(
                    credentials.clone(),
                    token_url,
                    Arc::clone(&transport),
                )?))
            }
            _ => None,
        };

        let executor = RequestExecutor::new(
            Arc::clone(&transport),
            self.default_headers,
            self.auth.clone(),
            token_manager.clone(),
        );

        let config = ClientConfig {
            base_url,
            api_prefix,
            front_page: self.front_page,
            auth: self.auth,
            use_default_entry_point: self.use_default_entry_point,
        };

        Ok(Client {
            config,
            executor,
            token_manager,
            deserializer: self
                .deserializer
                .unwrap_or_else(|| Arc::new(DenormalizingDeserializer)),
        })
    }
}
