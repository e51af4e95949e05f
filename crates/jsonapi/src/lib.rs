//! # Quarry JSON:API
//!
//! JSON:API document model for the Quarry headless CMS client.
//!
//! This crate contains:
//! - Resource objects, identifiers and compound documents
//! - JSON:API error objects and their message formatting
//! - Query parameter model with bracket/nested encoding
//! - Router path-translation metadata
//! - The pluggable document deserializer
//!
//! ## Architecture
//! - No dependencies on other Quarry crates
//! - Pure data structures, no I/O

pub mod document;
pub mod error;
pub mod params;
pub mod resource;

// Re-export commonly used items
pub use document::{DenormalizingDeserializer, Document, DocumentDeserializer};
pub use error::{format_errors, ErrorObject};
pub use params::ApiParams;
pub use resource::{
    EntityMeta, JsonApiLinks, MenuLink, PathAttribute, Resource, ResourceIdentifier,
    TranslatedPath,
};
