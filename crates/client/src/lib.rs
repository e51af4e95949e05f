//! # Quarry Client
//!
//! Resource-resolution and request-orchestration core for a headless CMS
//! backend exposing a JSON:API interface.
//!
//! This crate contains:
//! - The [`Client`] holding base URL, locale/prefix defaults, auth source
//!   and the access-token cache
//! - Path → resource resolution via batched subrequests
//! - Resource, collection, menu, view and search-index fetching
//! - Static path enumeration for ahead-of-time site generation
//! - The preview-redirect boundary adapter
//!
//! ## Concurrency
//! All operations are async and a single client may serve many in-flight
//! requests. The only shared mutable state is the cached access token;
//! concurrent refreshes are tolerated (last writer wins), not prevented.
//! There is no internal retry; failures surface to the caller, who owns
//! retry policy.

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod http;
pub mod menu;
pub mod options;
pub mod paths;
pub mod preview;
pub mod resolver;

// Re-export commonly used items
pub use auth::{AccessToken, AccessTokenProvider, AuthTokenManager, ClientCredentials};
pub use client::{Client, ClientBuilder, JSONAPI_CONTENT_TYPE};
pub use config::{AuthSource, ClientConfig};
pub use errors::{ClientError, Result};
pub use fetcher::{MenuResult, ViewResult};
pub use http::{HttpTransport, ReqwestTransport, RequestExecutor, RequestInit};
pub use menu::{build_menu_tree, MAX_MENU_DEPTH};
pub use options::RequestOptions;
pub use paths::{
    build_static_paths_params_from_paths, LocaleSet, StaticPath, StaticPathsOptions,
};
pub use preview::{PreviewHandler, PreviewOutcome, PreviewQuery};
pub use resolver::LATEST_VERSION;
