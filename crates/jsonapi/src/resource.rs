//! Resource objects and routing metadata
//!
//! Plain data shapes for JSON:API resource objects, the two-part resource
//! type identifier and the decoupled-router path translation payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Identifies a single resource as `(type, id)`.
///
/// The type is a two-part composite key of the form `entityKind--bundle`
/// (e.g. `node--article`). The `--` separator is structurally significant
/// when default entry point resolution bypasses index discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    /// Composite resource type, e.g. `node--article`
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource UUID
    pub id: Uuid,
}

impl ResourceIdentifier {
    /// Create a new identifier
    #[must_use]
    pub fn new(kind: impl Into<String>, id: Uuid) -> Self {
        Self { kind: kind.into(), id }
    }
}

/// Split a composite resource type into `(entity_kind, bundle)`.
///
/// Returns `None` when the type carries no `--` separator and therefore
/// cannot be mapped to a default entry point.
#[must_use]
pub fn split_resource_type(kind: &str) -> Option<(&str, &str)> {
    kind.split_once("--")
}

/// A JSON:API resource object with opaque attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Composite resource type
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource id (UUID for content entities)
    pub id: String,
    /// Attribute map, opaque to the client
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Relationship map, opaque to the client
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub relationships: Map<String, Value>,
    /// Resource-level links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

impl Resource {
    /// Extract the `path` attribute used for routing, if present.
    #[must_use]
    pub fn path(&self) -> Option<PathAttribute> {
        self.attributes
            .get("path")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// The `path` attribute carried by routable entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAttribute {
    /// Public path alias, e.g. `/blog/post-1`
    pub alias: String,
    /// Path id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<i64>,
    /// Language code the alias belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langcode: Option<String>,
}

/// Result of translating a public path into entity route metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedPath {
    /// Fully resolved URL of the path
    pub resolved: String,
    /// Whether the path is the configured front page
    #[serde(default, rename = "isHomePath")]
    pub is_home_path: bool,
    /// Routed entity metadata
    pub entity: EntityMeta,
    /// Entity label, when the router exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// JSON:API level links for the routed entity
    pub jsonapi: JsonApiLinks,
}

impl TranslatedPath {
    /// Identifier of the routed resource, when the router exposes its
    /// UUID.
    #[must_use]
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        let id = self.entity.uuid.as_deref()?.parse().ok()?;
        Some(ResourceIdentifier::new(self.jsonapi.resource_name.clone(), id))
    }
}

/// Entity metadata embedded in a translated path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Canonical path of the entity
    pub canonical: String,
    /// Entity kind, e.g. `node`
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Bundle, e.g. `article`
    pub bundle: String,
    /// Internal entity id
    pub id: String,
    /// Entity UUID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// JSON:API links for a routed entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonApiLinks {
    /// Individual resource URI template for the routed entity
    pub individual: String,
    /// Composite resource type name, e.g. `node--article`
    #[serde(rename = "resourceName")]
    pub resource_name: String,
    /// Base path of the JSON:API endpoint
    #[serde(default, rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// JSON:API entry point URL
    #[serde(default, rename = "entryPoint", skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

/// A single menu link. A flat ordered list of these forms a forest once
/// parent references are resolved; `parent == ""` marks a root link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuLink {
    /// Link id
    pub id: String,
    /// Parent link id, empty string for root links
    #[serde(default)]
    pub parent: String,
    /// Ordering weight within one level
    #[serde(default)]
    pub weight: i64,
    /// Link title
    pub title: String,
    /// Link target URL
    #[serde(default)]
    pub url: String,
    /// Child links, populated by tree building
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<MenuLink>,
}
