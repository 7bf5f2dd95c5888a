//! HTTP access to the backend.
//!
//! [`Gateway`] is the single path to the network; [`ApiClient`] layers
//! envelope decoding and per-resource services on top of it.

pub mod client;
pub mod error;
pub mod gateway;
pub mod request;
pub mod services;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiClient, decode_envelope};
pub use error::{ApiError, ApiResult};
pub use gateway::{Gateway, Outcome, REFRESH_PATH, is_refresh_exempt};
pub use request::{ApiRequest, ApiResponse, FilePart, FormValue, MultipartForm, RequestBody};
pub use services::SongUpload;
pub use transport::{HttpTransport, Transport, TransportError, TransportErrorKind};
