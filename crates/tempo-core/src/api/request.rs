//! Outbound request description and the response handed back to callers.
//!
//! Requests own their body (including file bytes) so the gateway can replay
//! them after a token refresh.

use std::path::Path;

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const AUTHORIZATION: &str = "Authorization";

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, sniffing its MIME type from content and
    /// falling back to the extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path.file_name().map_or_else(
            || "upload".to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let mime_type = sniff_mime(&bytes, path);
        Ok(Self::new(file_name, mime_type, Bytes::from(bytes)))
    }
}

fn sniff_mime(bytes: &[u8], path: &Path) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }
    mime_type_for_extension(path)
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Returns MIME type inferred from file extension for common upload formats.
pub fn mime_type_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension().and_then(|e| e.to_str())?;

    match ext.to_ascii_lowercase().as_str() {
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "ogg" | "oga" => Some("audio/ogg"),
        "flac" => Some("audio/flac"),
        "m4a" => Some("audio/mp4"),
        "aac" => Some("audio/aac"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(FilePart),
}

/// Replayable multipart form. Converted to a `reqwest` form at send time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub fields: Vec<(String, FormValue)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .push((name.into(), FormValue::Text(value.into())));
        self
    }

    #[must_use]
    pub fn file(mut self, name: impl Into<String>, part: FilePart) -> Self {
        self.fields.push((name.into(), FormValue::File(part)));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

/// A pending API call: path relative to the API base URL, method, extra
/// headers and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub path: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Adds (or replaces, case-insensitively) a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header(AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Serializes `body` as the JSON payload.
    ///
    /// # Errors
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> serde_json::Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_json_value(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_authorization(&self) -> bool {
        self.header(AUTHORIZATION).is_some()
    }

    /// First path segment after any leading slash, query string included.
    pub fn resource(&self) -> &str {
        let path = self.path.trim_start_matches('/');
        path.split('/').next().unwrap_or_default()
    }
}

/// Response as reported by the transport: status verbatim, headers, raw body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `message` from a JSON error body, else the trimmed body text.
    pub fn server_message(&self) -> Option<String> {
        if let Ok(json) = self.json::<Value>()
            && let Some(msg) = json.get("message").and_then(Value::as_str)
        {
            return Some(msg.to_string());
        }
        let text = self.text();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
