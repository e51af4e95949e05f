//! Client configuration
//!
//! Built once at process start and immutable afterwards; the only mutable
//! state a configured client carries is the access-token cache.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::auth::{AccessTokenProvider, ClientCredentials};

/// How outbound calls obtain their Authorization header.
#[derive(Clone)]
pub enum AuthSource {
    /// A static, preformatted header value (e.g. `"Basic abc123"`)
    Header(String),
    /// OAuth 2.0 client-credentials flow against the token endpoint
    ClientCredentials(ClientCredentials),
    /// A custom callback; takes precedence over the built-in flows
    Provider(Arc<dyn AccessTokenProvider>),
}

impl fmt::Debug for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(_) => f.write_str("AuthSource::Header(..)"),
            Self::ClientCredentials(credentials) => f
                .debug_struct("AuthSource::ClientCredentials")
                .field("client_id", &credentials.client_id)
                .finish_non_exhaustive(),
            Self::Provider(_) => f.write_str("AuthSource::Provider(..)"),
        }
    }
}

/// Immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (no trailing slash)
    pub base_url: Url,
    /// JSON:API path prefix, normalized to a leading `/`
    pub api_prefix: String,
    /// Path alias representing the site root
    pub front_page: String,
    /// Auth configuration, absent for anonymous-only clients
    pub auth: Option<AuthSource>,
    /// Resolve entry points by splitting `entity--bundle` instead of
    /// fetching the index document
    pub use_default_entry_point: bool,
}
