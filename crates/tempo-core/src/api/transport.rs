//! Raw HTTP transport.
//!
//! Reports every status verbatim (401 included); only failures to obtain a
//! response become [`TransportError`].

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use url::Url;

use super::request::{ApiRequest, ApiResponse, FormValue, MultipartForm, RequestBody};

/// Category of transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Could not reach the server
    Connect,
    /// Connect or request timeout elapsed
    Timeout,
    /// The request could not be built or sent
    Request,
    /// The response body could not be read
    Body,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Connect => write!(f, "connect"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Request => write!(f, "request"),
            TransportErrorKind::Body => write!(f, "body"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// Sends one request and returns whatever the server answered.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        url: &Url,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Builds a client with the given per-request timeout (`None` disables).
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("tempo/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::new(TransportErrorKind::Request, e.to_string()))?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, url: &Url, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self.http.request(request.method.clone(), url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(form) => builder.multipart(build_form(form)?),
        };

        let response = builder.send().await.map_err(classify_reqwest_error)?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| {
            TransportError::new(
                TransportErrorKind::Body,
                format!("Failed to read response body: {e}"),
            )
        })?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

fn build_form(form: &MultipartForm) -> Result<Form, TransportError> {
    let mut out = Form::new();
    for (name, value) in &form.fields {
        out = match value {
            FormValue::Text(text) => out.text(name.clone(), text.clone()),
            FormValue::File(file) => {
                let part = Part::bytes(file.bytes.to_vec())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.mime_type)
                    .map_err(|e| {
                        TransportError::new(
                            TransportErrorKind::Request,
                            format!("Invalid MIME type '{}': {e}", file.mime_type),
                        )
                    })?;
                out.part(name.clone(), part)
            }
        };
    }
    Ok(out)
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        TransportError::connect(format!("Connection failed: {e}"))
    } else if e.is_request() {
        TransportError::new(TransportErrorKind::Request, format!("Request error: {e}"))
    } else {
        TransportError::new(TransportErrorKind::Request, format!("Network error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display_is_message() {
        let err = TransportError::timeout("Request timed out: deadline");
        assert_eq!(err.to_string(), "Request timed out: deadline");
        assert_eq!(err.kind.to_string(), "timeout");
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        // Port 9 (discard) is essentially never listening on loopback.
        let transport = HttpTransport::new(Some(Duration::from_secs(5))).unwrap();
        let url = Url::parse("http://127.0.0.1:9/api/songs").unwrap();

        let err = transport
            .send(&url, &ApiRequest::get("songs"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.kind,
            TransportErrorKind::Connect | TransportErrorKind::Timeout | TransportErrorKind::Request
        ));
    }
}
