//! Typed entry point over the gateway.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tempo_types::Envelope;

use super::error::{ApiError, ApiResult};
use super::gateway::{Gateway, Outcome};
use super::request::{ApiRequest, ApiResponse};
use super::services::{Comments, Likes, Playlists, Posts, Songs, Users};
use super::transport::{HttpTransport, Transport};
use crate::auth::store::{CredentialStore, hydrate};
use crate::config::Config;
use crate::session::SessionHandle;

pub struct ApiClient<T = HttpTransport> {
    gateway: Gateway<T>,
}

impl ApiClient<HttpTransport> {
    /// Builds a client from config, restoring the session from `store`.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let base_url = config.api_base_url()?;
        let transport =
            HttpTransport::new(config.request_timeout()).context("Failed to build HTTP client")?;
        let session = SessionHandle::new(hydrate(store.as_ref()));
        tracing::debug!(base_url = %base_url, "api client ready");
        Ok(Self::new(Gateway::new(base_url, transport, session, store)))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(gateway: Gateway<T>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway<T> {
        &self.gateway
    }

    pub fn session(&self) -> &SessionHandle {
        self.gateway.session()
    }

    /// Sends through the gateway and returns the raw response.
    ///
    /// # Errors
    /// Returns [`ApiError::Transport`] if no response was obtained.
    pub async fn send(&self, request: &ApiRequest) -> ApiResult<(ApiResponse, Outcome)> {
        Ok(self.gateway.execute_traced(request).await?)
    }

    /// Sends and decodes the response envelope.
    ///
    /// # Errors
    /// Non-2xx statuses become [`ApiError::Status`], `success: false` becomes
    /// [`ApiError::Rejected`], and shape mismatches [`ApiError::Decode`].
    pub async fn call<R: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<Envelope<R>> {
        let response = self.gateway.execute(request).await?;
        decode_envelope(&response)
    }

    /// Like [`call`](Self::call), returning only `data`.
    ///
    /// # Errors
    /// As [`call`](Self::call); a missing `data` is [`ApiError::Decode`].
    pub async fn fetch<R: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<R> {
        self.call::<R>(request)
            .await?
            .data
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }

    pub fn users(&self) -> Users<'_, T> {
        Users::new(self)
    }

    pub fn songs(&self) -> Songs<'_, T> {
        Songs::new(self)
    }

    pub fn playlists(&self) -> Playlists<'_, T> {
        Playlists::new(self)
    }

    pub fn posts(&self) -> Posts<'_, T> {
        Posts::new(self)
    }

    pub fn likes(&self) -> Likes<'_, T> {
        Likes::new(self)
    }

    pub fn comments(&self) -> Comments<'_, T> {
        Comments::new(self)
    }
}

/// Checks status and `success`, then decodes the envelope.
///
/// # Errors
/// See [`ApiClient::call`].
pub fn decode_envelope<R: DeserializeOwned>(response: &ApiResponse) -> ApiResult<Envelope<R>> {
    if !response.is_success() {
        return Err(ApiError::from_status(response));
    }
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Envelope {
            success: true,
            message: None,
            data: None,
        });
    }

    let value: Value = response
        .json()
        .map_err(|e| ApiError::Decode(format!("invalid JSON: {e}")))?;
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        return Err(ApiError::Rejected(message.to_string()));
    }
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
