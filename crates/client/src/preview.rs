//! Preview-redirect boundary
//!
//! A thin adapter over the resolver for draft/revision previews. The
//! shared secret is injected at construction, never read from ambient
//! process state. The outcome type is transport-neutral so callers can
//! map it onto whatever HTTP framework serves the front end (redirect vs
//! 401 with a caller-overridable message).

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::client::Client;
use crate::errors::Result;
use crate::options::RequestOptions;

/// Parameters of an inbound preview request.
#[derive(Debug, Clone, Default)]
pub struct PreviewQuery {
    /// Shared secret supplied by the caller
    pub secret: Option<String>,
    /// Path of the entity to preview
    pub slug: Option<String>,
    /// Revision to preview; persisted as opaque state for subsequent
    /// requests
    pub resource_version: Option<String>,
    /// Requested locale
    pub locale: Option<String>,
    /// Site default locale
    pub default_locale: Option<String>,
}

/// Result of handling a preview request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// Redirect to the previewed path, carrying the revision selector
    Redirect {
        /// Redirect target path
        location: String,
        /// Revision to persist for subsequent requests
        resource_version: Option<String>,
    },
    /// The request failed validation; maps to a 401 response
    Unauthorized {
        /// Caller-facing message
        message: String,
    },
}

/// Validates and resolves preview requests.
pub struct PreviewHandler {
    client: Arc<Client>,
    secret: String,
    invalid_secret_message: String,
    invalid_slug_message: String,
}

impl PreviewHandler {
    /// Create a handler with the configured shared secret
    #[must_use]
    pub fn new(client: Arc<Client>, secret: impl Into<String>) -> Self {
        Self {
            client,
            secret: secret.into(),
            invalid_secret_message: "Invalid preview secret.".to_string(),
            invalid_slug_message: "Invalid slug.".to_string(),
        }
    }

    /// Override the message returned for an invalid secret
    #[must_use]
    pub fn invalid_secret_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_secret_message = message.into();
        self
    }

    /// Override the message returned for a missing or unresolvable slug
    #[must_use]
    pub fn invalid_slug_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_slug_message = message.into();
        self
    }

    /// Validate the query and resolve the preview redirect.
    ///
    /// # Errors
    /// Propagates resolver failures; validation failures are an
    /// [`PreviewOutcome::Unauthorized`] value, not an error.
    #[instrument(skip(self, query))]
    pub async fn handle(&self, query: &PreviewQuery) -> Result<PreviewOutcome> {
        if query.secret.as_deref() != Some(self.secret.as_str()) {
            debug!("preview secret mismatch");
            return Ok(PreviewOutcome::Unauthorized {
                message: self.invalid_secret_message.clone(),
            });
        }

        let Some(slug) = query.slug.as_deref() else {
            return Ok(PreviewOutcome::Unauthorized { message: self.invalid_slug_message.clone() });
        };

        let mut options = RequestOptions::new().with_auth(true).versionable(true);
        options.locale = query.locale.clone();
        options.default_locale = query.default_locale.clone();
        options.resource_version = query.resource_version.clone();

        let resource = self.client.get_resource_by_path(slug, &options).await?;
        if resource.is_none() {
            return Ok(PreviewOutcome::Unauthorized { message: self.invalid_slug_message.clone() });
        }

        Ok(PreviewOutcome::Redirect {
            location: slug.to_string(),
            resource_version: query.resource_version.clone(),
        })
    }
}
