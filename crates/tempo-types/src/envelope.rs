//! Response envelope shared by every backend endpoint.

use serde::{Deserialize, Serialize};

fn default_success() -> bool {
    true
}

/// Standard `{ success, message, data }` wrapper.
///
/// A missing `success` key is read as `true`; the HTTP status has already
/// been checked by the time an envelope is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Returns the server message, or `fallback` when none was sent.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(fallback)
    }
}

/// Paged listing (`{ total, data: [...] }`), used by the post feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}
