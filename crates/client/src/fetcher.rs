//! Resource and collection fetching
//!
//! Endpoint resolution goes through the JSON:API index document. When
//! the default entry point shortcut is enabled it splits the
//! `entity--bundle` type instead and skips the index lookup. Menus,
//! views and search indexes are thin collection fetches over named
//! endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use quarry_jsonapi::error::format_errors;
use quarry_jsonapi::resource::split_resource_type;
use quarry_jsonapi::{ApiParams, MenuLink, Resource, ResourceIdentifier};

use crate::client::Client;
use crate::errors::{ClientError, Result};
use crate::http::RequestInit;
use crate::menu::build_menu_tree;
use crate::options::RequestOptions;

/// A fetched menu: the flat ordered links and the nested tree built from
/// their parent references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuResult {
    /// Flat links in fetch order
    pub items: Vec<MenuLink>,
    /// Links nested by parent reference
    pub tree: Vec<MenuLink>,
}

/// A fetched view result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewResult {
    /// The `viewId--displayId` name the view was requested as
    pub id: String,
    /// Deserialized view rows
    pub results: Value,
    /// Top-level meta (result count etc.)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    /// Pagination links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

impl Client {
    /// Fetch the JSON:API index document for the requested locale.
    ///
    /// # Errors
    /// Returns `ClientError::Request` on a non-success response.
    pub async fn get_index(&self, options: &RequestOptions) -> Result<Value> {
        let url = self.api_url(options, "")?;
        let response =
            self.executor().execute(url, RequestInit::get().with_auth(options.with_auth)).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Request(format!("failed to parse index document: {e}")))
    }

    /// Resolve the collection endpoint for a resource type.
    pub(crate) async fn entry_point_for(
        &self,
        resource_type: &str,
        options: &RequestOptions,
    ) -> Result<Url> {
        if self.config().use_default_entry_point {
            let (entity, bundle) = split_resource_type(resource_type).ok_or_else(|| {
                ClientError::Config(format!(
                    "resource type `{resource_type}` cannot be mapped to a default entry point"
                ))
            })?;
            return self.api_url(options, &format!("/{entity}/{bundle}"));
        }

        let index = self.get_index(options).await?;
        let href = index
            .get("links")
            .and_then(|links| links.get(resource_type))
            .and_then(|link| link.get("href"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ClientError::ResourceTypeNotFound(format!(
                    "{resource_type} (locale: {})",
                    options.locale.as_deref().unwrap_or("default")
                ))
            })?;

        Url::parse(href)
            .map_err(|e| ClientError::Request(format!("index entry for {resource_type} is not a valid URL: {e}")))
    }

    /// Fetch a single resource by type and id.
    ///
    /// # Errors
    /// - `ClientError::ResourceTypeNotFound` when the index has no entry
    ///   for the type
    /// - `ClientError::JsonApi` / `ClientError::Request` on failure
    ///   responses
    #[instrument(skip(self, options), fields(resource_type = %resource_type, id = %id))]
    pub async fn get_resource(
        &self,
        resource_type: &str,
        id: &str,
        options: &RequestOptions,
    ) -> Result<Value> {
        let mut url = self.entry_point_for(resource_type, options).await?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Config("entry point URL cannot carry segments".to_string()))?
            .push(id);

        let mut params = options.params.clone();
        let versionable =
            options.versionable.unwrap_or_else(|| resource_type.starts_with("node--"));
        if versionable {
            if let Some(version) = options.resource_version.as_deref() {
                params = params.resource_version(version);
            }
        }
        apply_params(&mut url, &params);

        let document = self.fetch_document(url, options.with_auth).await?;
        if document.has_errors() {
            return Err(ClientError::JsonApi(format_errors(&document.errors)));
        }
        self.deserialize_document(&document, options.raw)
    }

    /// Fetch a single resource by identifier, e.g. one produced by
    /// [`TranslatedPath::identifier`](quarry_jsonapi::TranslatedPath::identifier).
    ///
    /// # Errors
    /// Same classification as [`Client::get_resource`].
    pub async fn get_resource_by_identifier(
        &self,
        identifier: &ResourceIdentifier,
        options: &RequestOptions,
    ) -> Result<Value> {
        self.get_resource(&identifier.kind, &identifier.id.to_string(), options).await
    }

    /// Fetch a paged/filtered collection of resources by type.
    ///
    /// # Errors
    /// Same classification as [`Client::get_resource`].
    #[instrument(skip(self, options), fields(resource_type = %resource_type))]
    pub async fn get_resource_collection(
        &self,
        resource_type: &str,
        options: &RequestOptions,
    ) -> Result<Value> {
        let mut url = self.entry_point_for(resource_type, options).await?;
        apply_params(&mut url, &options.params);

        let document = self.fetch_document(url, options.with_auth).await?;
        if document.has_errors() {
            return Err(ClientError::JsonApi(format_errors(&document.errors)));
        }
        self.deserialize_document(&document, options.raw)
    }

    /// Fetch a menu by name and build its link tree.
    ///
    /// # Errors
    /// Returns `ClientError::Request` on a non-success response.
    #[instrument(skip(self, options), fields(menu = %name))]
    pub async fn get_menu(&self, name: &str, options: &RequestOptions) -> Result<MenuResult> {
        let mut url = self.api_url(options, &format!("/menu_items/{name}"))?;
        apply_params(&mut url, &options.params);

        let document = self.fetch_document(url, options.with_auth).await?;
        if document.has_errors() {
            return Err(ClientError::JsonApi(format_errors(&document.errors)));
        }

        let items: Vec<MenuLink> = match &document.data {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| serde_json::from_value::<Resource>(entry.clone()).ok())
                .map(|resource| menu_link_from_resource(&resource))
                .collect(),
            _ => Vec::new(),
        };

        let tree = build_menu_tree(&items, "");
        Ok(MenuResult { items, tree })
    }

    /// Fetch a view result by `viewId--displayId` name.
    ///
    /// # Errors
    /// Returns `ClientError::Config` when the name has no `--` separator.
    #[instrument(skip(self, options), fields(view = %name))]
    pub async fn get_view(&self, name: &str, options: &RequestOptions) -> Result<ViewResult> {
        let (view_id, display_id) = name.split_once("--").ok_or_else(|| {
            ClientError::Config(format!("view name `{name}` is not in the form viewId--displayId"))
        })?;

        let mut url = self.api_url(options, &format!("/views/{view_id}/{display_id}"))?;
        apply_params(&mut url, &options.params);

        let document = self.fetch_document(url, options.with_auth).await?;
        if document.has_errors() {
            return Err(ClientError::JsonApi(format_errors(&document.errors)));
        }

        Ok(ViewResult {
            id: name.to_string(),
            results: self.deserialize_document(&document, options.raw)?,
            meta: document.meta,
            links: document.links,
        })
    }

    /// Query a named search index.
    ///
    /// # Errors
    /// Returns `ClientError::Request` on a non-success response.
    #[instrument(skip(self, options), fields(index = %name))]
    pub async fn get_search_index(&self, name: &str, options: &RequestOptions) -> Result<Value> {
        let mut url = self.api_url(options, &format!("/index/{name}"))?;
        apply_params(&mut url, &options.params);

        let document = self.fetch_document(url, options.with_auth).await?;
        if document.has_errors() {
            return Err(ClientError::JsonApi(format_errors(&document.errors)));
        }
        self.deserialize_document(&document, options.raw)
    }
}

fn apply_params(url: &mut Url, params: &ApiParams) {
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.to_query_pairs());
    }
}

fn menu_link_from_resource(resource: &Resource) -> MenuLink {
    let attribute = |name: &str| {
        resource.attributes.get(name).and_then(Value::as_str).unwrap_or_default().to_string()
    };

    // Menu item weights arrive as numbers or numeric strings depending on
    // the backend serializer
    let weight = match resource.attributes.get("weight") {
        Some(Value::Number(number)) => number.as_i64().unwrap_or(0),
        Some(Value::String(text)) => text.parse().unwrap_or(0),
        _ => 0,
    };

    MenuLink {
        id: resource.id.clone(),
        parent: attribute("parent"),
        weight,
        title: attribute("title"),
        url: attribute("url"),
        items: Vec::new(),
    }
}
