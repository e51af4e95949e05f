//! Path → resource resolution
//!
//! Translating a public path and fetching the routed resource are batched
//! into a single `POST /subrequests` call: the second sub-request waits
//! for the router and interpolates its JSON:API individual link. Batching
//! removes a sequential round trip and closes the window in which the
//! path could be rewritten between translation and fetch. Every content
//! page resolution goes through here.

use std::collections::HashMap;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use quarry_jsonapi::error::format_errors;
use quarry_jsonapi::{Document, TranslatedPath};

use crate::client::{Client, JSONAPI_CONTENT_TYPE};
use crate::errors::{ClientError, Result};
use crate::http::{RequestExecutor, RequestInit};
use crate::options::RequestOptions;

/// Revision selector applied to versionable entities by default
pub const LATEST_VERSION: &str = "rel:latest-version";

const ROUTER_REQUEST_ID: &str = "router";
const RESOURCE_REQUEST_ID: &str = "resolvedResource";

/// One entry of a subrequest batch payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Subrequest {
    request_id: String,
    action: String,
    uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for: Option<Vec<String>>,
}

/// One entry of a subrequest batch response, keyed `"{requestId}#uri{n}"`.
#[derive(Debug, Deserialize)]
struct Subresponse {
    #[serde(default)]
    body: Option<String>,
}

impl Client {
    /// Translate a public path into entity route metadata with a direct
    /// (non-batched) router call.
    ///
    /// Returns `None` when the path does not resolve to any entity.
    ///
    /// # Errors
    /// Returns `ClientError::Request` on transport failure or any
    /// non-success response other than a router miss.
    #[instrument(skip(self, options), fields(path = %path))]
    pub async fn translate_path(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Option<TranslatedPath>> {
        let path = normalize_path(path, options);
        let url = self.endpoint_url(
            options,
            &format!("/router/translate-path?path={}&_format=json", urlencoding::encode(&path)),
        )?;

        let response = self
            .executor()
            .dispatch(url, RequestInit::get().with_auth(options.with_auth))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("router miss");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RequestExecutor::classify_failure(response).await);
        }

        let translated = response
            .json::<TranslatedPath>()
            .await
            .map_err(|e| ClientError::Request(format!("failed to parse router response: {e}")))?;
        Ok(Some(translated))
    }

    /// Resolve a public path to its content resource in a single network
    /// round trip.
    ///
    /// Returns `None` when the path does not resolve to any entity,
    /// a valid "not found" outcome rather than an error.
    ///
    /// # Errors
    /// - `ClientError::Request` when the router sub-response embeds an
    ///   error message
    /// - `ClientError::JsonApi` when the resolved resource carries an
    ///   `errors` array
    #[instrument(skip(self, options), fields(path = %path))]
    pub async fn get_resource_by_path(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Option<Value>> {
        let path = normalize_path(path, options);

        // Versionable by explicit opt-in here; the routed type is not
        // known until the router sub-request runs server-side.
        let versionable = options.versionable.unwrap_or(false) || options.resource_version.is_some();
        let mut params = options.params.clone();
        if versionable {
            let version = options.resource_version.as_deref().unwrap_or(LATEST_VERSION);
            params = params.resource_version(version);
        }

        let router_uri =
            format!("/router/translate-path?path={}&_format=json", urlencoding::encode(&path));
        let mut resource_uri = format!("{{{{{ROUTER_REQUEST_ID}.body@$.jsonapi.individual}}}}");
        if !params.is_empty() {
            resource_uri.push('?');
            resource_uri.push_str(&params.to_query_string());
        }

        let payload = vec![
            Subrequest {
                request_id: ROUTER_REQUEST_ID.to_string(),
                action: "view".to_string(),
                uri: router_uri,
                headers: Some(HashMap::from([(
                    "Accept".to_string(),
                    JSONAPI_CONTENT_TYPE.to_string(),
                )])),
                wait_for: None,
            },
            Subrequest {
                request_id: RESOURCE_REQUEST_ID.to_string(),
                action: "view".to_string(),
                uri: resource_uri,
                headers: None,
                wait_for: Some(vec![ROUTER_REQUEST_ID.to_string()]),
            },
        ];

        let url = self.endpoint_url(options, "/subrequests?_format=json")?;
        let init = RequestInit::post()
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_auth(options.with_auth)
            .json_body(&payload)?;

        let response = self.executor().execute(url, init).await?;
        let batch: HashMap<String, Subresponse> = response
            .json()
            .await
            .map_err(|e| ClientError::Request(format!("failed to parse subrequests response: {e}")))?;

        let resolved_body = batch
            .iter()
            .find(|(key, _)| key.starts_with(RESOURCE_REQUEST_ID))
            .and_then(|(_, subresponse)| subresponse.body.as_deref())
            .filter(|body| !body.is_empty());

        let Some(body) = resolved_body else {
            // A router-embedded error message fails the call; a plain
            // miss resolves to None.
            if let Some(message) = batch
                .get(ROUTER_REQUEST_ID)
                .and_then(|subresponse| subresponse.body.as_deref())
                .and_then(extract_router_error)
            {
                return Err(ClientError::Request(message));
            }
            debug!("path did not resolve to an entity");
            return Ok(None);
        };

        let document: Document = serde_json::from_str(body)
            .map_err(|e| ClientError::Request(format!("failed to parse resolved resource: {e}")))?;

        if document.has_errors() {
            return Err(ClientError::JsonApi(format_errors(&document.errors)));
        }

        Ok(Some(self.deserialize_document(&document, options.raw)?))
    }
}

/// Apply the locale prefix when a non-default locale is requested and
/// the path does not already carry it.
fn normalize_path(path: &str, options: &RequestOptions) -> String {
    let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };

    match options.locale_prefix() {
        Some(locale) => {
            let prefix = format!("/{locale}");
            if path == prefix || path.starts_with(&format!("{prefix}/")) {
                path
            } else {
                format!("{prefix}{path}")
            }
        }
        None => path,
    }
}

fn extract_router_error(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("message")?.as_str().map(str::to_string)
}
