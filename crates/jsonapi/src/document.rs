//! Compound documents and deserialization
//!
//! A JSON:API response body is a compound document: primary `data` (one
//! resource object or a list), side-loaded `included` resources and an
//! optional `errors` array. The [`DocumentDeserializer`] seam converts a
//! document into plain objects; the default implementation flattens
//! attributes onto the object and resolves relationships against
//! `included`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ErrorObject;
use crate::resource::Resource;

/// A JSON:API compound document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Primary data: a resource object, an array of them, or absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Side-loaded related resources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource>,
    /// Error objects; JSON:API makes these mutually exclusive with `data`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorObject>,
    /// Top-level links (pagination etc.)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    /// Top-level meta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Document {
    /// Whether the document carries an `errors` array
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Converts raw compound documents into plain resource objects.
///
/// Pluggable so callers can swap in their own denormalization (or none);
/// the client holds an `Arc<dyn DocumentDeserializer>`.
pub trait DocumentDeserializer: Send + Sync {
    /// Convert `document` into a plain value: an object for individual
    /// resources, an array for collections, `Null` when data is absent.
    fn deserialize(&self, document: &Document) -> Value;
}

/// Default deserializer: merges attributes onto the resource object and
/// resolves relationships against `included`, tracking visited resources
/// so circular relationship graphs terminate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenormalizingDeserializer;

impl DocumentDeserializer for DenormalizingDeserializer {
    fn deserialize(&self, document: &Document) -> Value {
        let included: HashMap<(String, String), &Resource> = document
            .included
            .iter()
            .map(|resource| ((resource.kind.clone(), resource.id.clone()), resource))
            .collect();

        match &document.data {
            Some(Value::Array(items)) => Value::Array(
                items.iter().map(|item| denormalize_value(item, &included)).collect(),
            ),
            Some(item @ Value::Object(_)) => denormalize_value(item, &included),
            _ => Value::Null,
        }
    }
}

fn denormalize_value(item: &Value, included: &HashMap<(String, String), &Resource>) -> Value {
    match serde_json::from_value::<Resource>(item.clone()) {
        Ok(resource) => {
            let mut visited = HashSet::new();
            denormalize_resource(&resource, included, &mut visited)
        }
        // Not a resource object shape; pass through untouched
        Err(_) => item.clone(),
    }
}

fn denormalize_resource(
    resource: &Resource,
    included: &HashMap<(String, String), &Resource>,
    visited: &mut HashSet<(String, String)>,
) -> Value {
    let mut object = Map::new();
    object.insert("type".to_string(), Value::String(resource.kind.clone()));
    object.insert("id".to_string(), Value::String(resource.id.clone()));

    for (key, value) in &resource.attributes {
        object.insert(key.clone(), value.clone());
    }

    visited.insert((resource.kind.clone(), resource.id.clone()));

    for (name, relationship) in &resource.relationships {
        let Some(data) = relationship.get("data") else {
            continue;
        };

        let resolved = match data {
            Value::Array(identifiers) => Value::Array(
                identifiers
                    .iter()
                    .map(|identifier| resolve_identifier(identifier, included, visited))
                    .collect(),
            ),
            Value::Object(_) => resolve_identifier(data, included, visited),
            other => other.clone(),
        };

        object.insert(name.clone(), resolved);
    }

    visited.remove(&(resource.kind.clone(), resource.id.clone()));

    Value::Object(object)
}

fn resolve_identifier(
    identifier: &Value,
    included: &HashMap<(String, String), &Resource>,
    visited: &mut HashSet<(String, String)>,
) -> Value {
    let (Some(kind), Some(id)) = (
        identifier.get("type").and_then(Value::as_str),
        identifier.get("id").and_then(Value::as_str),
    ) else {
        return identifier.clone();
    };

    let key = (kind.to_string(), id.to_string());
    if visited.contains(&key) {
        // Relationship cycle; keep the bare identifier
        return identifier.clone();
    }

    match included.get(&key) {
        Some(resource) => denormalize_resource(resource, included, visited),
        None => identifier.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn deserialize(document: Value) -> Value {
        let document: Document = serde_json::from_value(document).unwrap();
        DenormalizingDeserializer.deserialize(&document)
    }

    #[test]
    fn flattens_attributes_onto_object() {
        let result = deserialize(json!({
            "data": {
                "type": "node--article",
                "id": "a1",
                "attributes": { "title": "Hello", "status": true }
            }
        }));

        assert_eq!(result["type"], "node--article");
        assert_eq!(result["id"], "a1");
        assert_eq!(result["title"], "Hello");
        assert_eq!(result["status"], true);
    }

    #[test]
    fn resolves_relationships_from_included() {
        let result = deserialize(json!({
            "data": {
                "type": "node--article",
                "id": "a1",
                "attributes": { "title": "Hello" },
                "relationships": {
                    "field_image": { "data": { "type": "file--file", "id": "f1" } }
                }
            },
            "included": [{
                "type": "file--file",
                "id": "f1",
                "attributes": { "uri": "public://hello.jpg" }
            }]
        }));

        assert_eq!(result["field_image"]["uri"], "public://hello.jpg");
    }

    #[test]
    fn unresolved_identifier_is_kept() {
        let result = deserialize(json!({
            "data": {
                "type": "node--article",
                "id": "a1",
                "relationships": {
                    "uid": { "data": { "type": "user--user", "id": "u1" } }
                }
            }
        }));

        assert_eq!(result["uid"]["type"], "user--user");
        assert_eq!(result["uid"]["id"], "u1");
    }

    #[test]
    fn circular_relationships_terminate() {
        let result = deserialize(json!({
            "data": {
                "type": "node--page",
                "id": "p1",
                "relationships": {
                    "parent": { "data": { "type": "node--page", "id": "p2" } }
                }
            },
            "included": [{
                "type": "node--page",
                "id": "p2",
                "relationships": {
                    "parent": { "data": { "type": "node--page", "id": "p1" } }
                }
            }]
        }));

        // p1 -> p2 resolves, p2 -> p1 stops at the bare identifier
        assert_eq!(result["parent"]["id"], "p2");
        assert_eq!(result["parent"]["parent"]["id"], "p1");
        assert!(result["parent"]["parent"].get("parent").is_none());
    }

    #[test]
    fn collection_yields_array() {
        let result = deserialize(json!({
            "data": [
                { "type": "node--article", "id": "a1", "attributes": { "title": "One" } },
                { "type": "node--article", "id": "a2", "attributes": { "title": "Two" } }
            ]
        }));

        let items = result.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["title"], "Two");
    }

    #[test]
    fn absent_data_yields_null() {
        let result = deserialize(json!({ "errors": [] }));
        assert!(result.is_null());
    }
}
