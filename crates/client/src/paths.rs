//! Static path enumeration
//!
//! Enumerates every public path for a set of resource types, per locale,
//! for ahead-of-time site generation. Only routing data is needed, so
//! collections are fetched with a sparse fieldset limited to the `path`
//! attribute. Locale fan-out is concurrent and all-or-nothing: one
//! failing locale fails the whole call.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use quarry_jsonapi::error::format_errors;
use quarry_jsonapi::{ApiParams, Resource};

use crate::client::Client;
use crate::errors::{ClientError, Result};
use crate::options::RequestOptions;

/// One buildable page: ordered slug segments plus its locale tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPath {
    /// Path split on `/`, prefix stripped; empty for the site root
    pub segments: Vec<String>,
    /// Locale tag, present when locales are in use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// Locales to enumerate paths for.
#[derive(Debug, Clone, Default)]
pub struct LocaleSet {
    /// Configured locales; empty means a single unlocalized pass
    pub locales: Vec<String>,
    /// The default locale, which is not path-prefixed
    pub default_locale: Option<String>,
}

/// Options for static path enumeration.
#[derive(Debug, Clone, Default)]
pub struct StaticPathsOptions {
    /// Extra query parameters appended after the sparse fieldset
    pub params: ApiParams,
    /// Path prefix segment to strip from aliases (e.g. `/blog`)
    pub path_prefix: Option<String>,
    /// Fetch collections with authenticated access
    pub with_auth: bool,
}

impl Client {
    /// Enumerate static paths for `types` across the configured locales.
    ///
    /// Per-type and per-locale fetches run concurrently and are flattened
    /// in issue order; ordering beyond that is not guaranteed.
    ///
    /// # Errors
    /// - `ClientError::MissingAttribute` when a fetched resource carries
    ///   no `path` attribute
    /// - any fetch failure from the underlying collection calls
    #[instrument(skip(self, locales, options), fields(types = ?types))]
    pub async fn get_static_paths(
        &self,
        types: &[&str],
        locales: &LocaleSet,
        options: &StaticPathsOptions,
    ) -> Result<Vec<StaticPath>> {
        let mut fetches = Vec::new();
        for resource_type in types {
            if locales.locales.is_empty() {
                fetches.push(self.static_paths_for(resource_type, None, locales, options));
            } else {
                for locale in &locales.locales {
                    fetches.push(self.static_paths_for(
                        resource_type,
                        Some(locale.clone()),
                        locales,
                        options,
                    ));
                }
            }
        }

        let results = try_join_all(fetches).await?;
        Ok(results.into_iter().flatten().collect())
    }

    async fn static_paths_for(
        &self,
        resource_type: &str,
        locale: Option<String>,
        locales: &LocaleSet,
        options: &StaticPathsOptions,
    ) -> Result<Vec<StaticPath>> {
        let params =
            ApiParams::new().fields(resource_type, &["path"]).extend(&options.params);
        let request = RequestOptions {
            locale: locale.clone(),
            default_locale: locales.default_locale.clone(),
            with_auth: options.with_auth,
            params,
            ..RequestOptions::default()
        };

        let mut url = self.entry_point_for(resource_type, &request).await?;
        if !request.params.is_empty() {
            url.query_pairs_mut().extend_pairs(request.params.to_query_pairs());
        }

        let document = self.fetch_document(url, options.with_auth).await?;
        if document.has_errors() {
            return Err(ClientError::JsonApi(format_errors(&document.errors)));
        }
        let resources: Vec<Resource> = match &document.data {
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| {
                    serde_json::from_value(entry.clone()).map_err(|e| {
                        ClientError::Request(format!("collection entry is not a resource: {e}"))
                    })
                })
                .collect::<Result<_>>()?,
            _ => Vec::new(),
        };

        self.build_static_paths_from_resources(
            &resources,
            locale.as_deref(),
            options.path_prefix.as_deref(),
        )
    }

    /// Map fetched resources to static paths using their path aliases.
    /// The front-page alias maps to the site root.
    ///
    /// # Errors
    /// Returns `ClientError::MissingAttribute` when a resource has no
    /// `path` attribute.
    pub fn build_static_paths_from_resources(
        &self,
        resources: &[Resource],
        locale: Option<&str>,
        path_prefix: Option<&str>,
    ) -> Result<Vec<StaticPath>> {
        let mut aliases = Vec::with_capacity(resources.len());
        for resource in resources {
            let path = resource.path().ok_or_else(|| {
                ClientError::MissingAttribute(format!(
                    "resource {} {} has no path attribute",
                    resource.kind, resource.id
                ))
            })?;

            let alias =
                if path.alias == self.config().front_page { "/".to_string() } else { path.alias };
            aliases.push(alias);
        }

        Ok(build_static_paths_params_from_paths(&aliases, path_prefix, locale))
    }
}

/// Convert path aliases into slug segments: the prefix is stripped,
/// leading/trailing slashes removed, and the remainder split on `/`.
#[must_use]
pub fn build_static_paths_params_from_paths(
    paths: &[String],
    path_prefix: Option<&str>,
    locale: Option<&str>,
) -> Vec<StaticPath> {
    paths
        .iter()
        .map(|path| {
            let mut slug = path.trim_matches('/');
            if let Some(prefix) = path_prefix.map(|prefix| prefix.trim_matches('/')) {
                if !prefix.is_empty() {
                    if slug == prefix {
                        slug = "";
                    } else if let Some(rest) = slug.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('/')) {
                        slug = rest;
                    }
                }
            }

            StaticPath {
                segments: slug.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect(),
                locale: locale.map(str::to_string),
            }
        })
        .collect()
}
