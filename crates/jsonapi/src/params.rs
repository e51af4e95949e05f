//! JSON:API query parameters
//!
//! Filters, sparse fieldsets, includes, sorting and pagination are
//! hierarchical, so keys use bracket/nested notation (`filter[status]`,
//! `fields[node--article]`, `page[limit]`) rather than flat pairs.
//! [`ApiParams`] is the closed parameter type the client flattens into
//! query pairs before encoding.

use serde::{Deserialize, Serialize};

/// Ordered JSON:API query parameters.
///
/// Insertion order is preserved so generated URLs are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiParams {
    pairs: Vec<(String, String)>,
}

impl ApiParams {
    /// Create an empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw `key=value` pair. The key may already carry bracket
    /// notation, e.g. `filter[status]`.
    #[must_use]
    pub fn raw(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Add a `filter[{field}]={value}` pair
    #[must_use]
    pub fn filter(self, field: &str, value: impl Into<String>) -> Self {
        self.raw(format!("filter[{field}]"), value)
    }

    /// Add a sparse fieldset, `fields[{resource_type}]={fields}`
    #[must_use]
    pub fn fields(self, resource_type: &str, fields: &[&str]) -> Self {
        self.raw(format!("fields[{resource_type}]"), fields.join(","))
    }

    /// Add an `include={relationships}` pair
    #[must_use]
    pub fn include(self, relationships: &[&str]) -> Self {
        self.raw("include", relationships.join(","))
    }

    /// Add a `sort={fields}` pair
    #[must_use]
    pub fn sort(self, fields: &[&str]) -> Self {
        self.raw("sort", fields.join(","))
    }

    /// Add a `page[limit]={limit}` pair
    #[must_use]
    pub fn page_limit(self, limit: u32) -> Self {
        self.raw("page[limit]", limit.to_string())
    }

    /// Add a `page[offset]={offset}` pair
    #[must_use]
    pub fn page_offset(self, offset: u32) -> Self {
        self.raw("page[offset]", offset.to_string())
    }

    /// Add a `resourceVersion={version}` pair selecting an entity revision
    #[must_use]
    pub fn resource_version(self, version: impl Into<String>) -> Self {
        self.raw("resourceVersion", version)
    }

    /// Append all pairs from another parameter set
    #[must_use]
    pub fn extend(mut self, other: &ApiParams) -> Self {
        self.pairs.extend(other.pairs.iter().cloned());
        self
    }

    /// Whether no parameters have been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Flatten into ordered query pairs, ready for percent-encoding
    #[must_use]
    pub fn to_query_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Render as a percent-encoded query string (no leading `?`)
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}
