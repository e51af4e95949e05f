//! JSON:API error objects
//!
//! Error payload shapes from `application/vnd.api+json` responses and the
//! message formatting applied before they surface to callers.

use serde::{Deserialize, Serialize};

/// A single entry of a JSON:API `errors` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    /// HTTP status code as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Short, human-readable summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable explanation specific to this occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Format an `errors` array into a single message.
///
/// Only the first entry is reported, as `"{status} {title}\n{detail}"`;
/// the detail line is omitted when absent. An empty array yields an
/// empty message.
#[must_use]
pub fn format_errors(errors: &[ErrorObject]) -> String {
    let Some(first) = errors.first() else {
        return String::new();
    };

    let mut message = format!(
        "{} {}",
        first.status.as_deref().unwrap_or_default(),
        first.title.as_deref().unwrap_or_default()
    );

    if let Some(detail) = &first.detail {
        message.push('\n');
        message.push_str(detail);
    }

    message.trim().to_string()
}
