use std::fmt;

use reqwest::StatusCode;

use super::request::ApiResponse;
use super::transport::TransportError;

/// Failure of a typed service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response was obtained
    Transport(TransportError),
    /// Non-2xx status, with the server's `message` when it sent one
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    /// 2xx envelope with `success: false`
    Rejected(String),
    /// Body did not match the expected shape
    Decode(String),
    /// Resource id unusable as a path segment
    InvalidId(String),
    /// Request could not be built locally
    Invalid(String),
}

impl ApiError {
    pub fn from_status(response: &ApiResponse) -> Self {
        ApiError::Status {
            status: response.status,
            message: response.server_message(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(e) => write!(f, "{e}"),
            ApiError::Status {
                status,
                message: Some(msg),
            } => write!(f, "HTTP {}: {msg}", status.as_u16()),
            ApiError::Status {
                status,
                message: None,
            } => write!(f, "HTTP {status}"),
            ApiError::Rejected(msg) => write!(f, "Request rejected: {msg}"),
            ApiError::Decode(msg) => write!(f, "Unexpected response: {msg}"),
            ApiError::InvalidId(id) => write!(f, "Invalid id '{id}'"),
            ApiError::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::Transport(e)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Checks that `id` can be used as a single path segment.
///
/// # Errors
/// Returns [`ApiError::InvalidId`] for empty ids, ids made only of dots, or
/// ids containing `/`, `?` or `#`.
pub fn check_id(id: &str) -> ApiResult<&str> {
    let trimmed = id.trim();
    if trimmed.chars().all(|c| c == '.') || trimmed.contains(['/', '?', '#']) {
        return Err(ApiError::InvalidId(id.to_string()));
    }
    Ok(trimmed)
}
