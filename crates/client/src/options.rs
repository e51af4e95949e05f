//! Per-call request options
//!
//! Supplied per call and never stored on the client. Explicit named
//! optional fields with documented defaults; no option-object probing.

use quarry_jsonapi::ApiParams;

/// Options applied to a single client operation.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Requested locale; a non-default locale prefixes API paths
    pub locale: Option<String>,
    /// The site default locale the request locale is compared against
    pub default_locale: Option<String>,
    /// Resolve and inject an Authorization header
    pub with_auth: bool,
    /// JSON:API query parameters
    pub params: ApiParams,
    /// Return the raw compound document instead of deserializing
    pub raw: bool,
    /// Select a specific revision of a versionable entity.
    /// `rel:latest-version` selects the newest revision.
    pub resource_version: Option<String>,
    /// Override the versionable heuristic (`node--` type prefix)
    pub versionable: Option<bool>,
}

impl RequestOptions {
    /// Default options: default locale, anonymous, no params
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested locale
    #[must_use]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the default locale
    #[must_use]
    pub fn default_locale(mut self, default_locale: impl Into<String>) -> Self {
        self.default_locale = Some(default_locale.into());
        self
    }

    /// Request authenticated access
    #[must_use]
    pub fn with_auth(mut self, with_auth: bool) -> Self {
        self.with_auth = with_auth;
        self
    }

    /// Set query parameters
    #[must_use]
    pub fn params(mut self, params: ApiParams) -> Self {
        self.params = params;
        self
    }

    /// Skip deserialization and return the raw document
    #[must_use]
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Request a specific resource revision
    #[must_use]
    pub fn resource_version(mut self, version: impl Into<String>) -> Self {
        self.resource_version = Some(version.into());
        self
    }

    /// Force or suppress versionable treatment
    #[must_use]
    pub fn versionable(mut self, versionable: bool) -> Self {
        self.versionable = Some(versionable);
        self
    }

    /// The locale to prefix API paths with, when it differs from the
    /// default locale.
    #[must_use]
    pub fn locale_prefix(&self) -> Option<&str> {
        match (&self.locale, &self.default_locale) {
            (Some(locale), Some(default_locale)) if locale != default_locale => Some(locale),
            (Some(locale), None) => Some(locale),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_prefix_only_for_non_default_locale() {
        let options = RequestOptions::new().locale("de").default_locale("en");
        assert_eq!(options.locale_prefix(), Some("de"));

        let options = RequestOptions::new().locale("en").default_locale("en");
        assert_eq!(options.locale_prefix(), None);

        let options = RequestOptions::new().locale("de");
        assert_eq!(options.locale_prefix(), Some("de"));

        assert_eq!(RequestOptions::new().locale_prefix(), None);
    }
}
