use serde_json::Value;
use tempo_types::{Envelope, User};

use super::{item_path, json_body};
use crate::api::client::ApiClient;
use crate::api::error::ApiResult;
use crate::api::request::ApiRequest;
use crate::api::transport::Transport;

const RESOURCE: &str = "users";

/// User directory (`users`).
pub struct Users<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> Users<'a, T> {
    pub(crate) fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns an error if the request fails or the body does not decode.
    pub async fn list(&self) -> ApiResult<Vec<User>> {
        self.api.fetch(&ApiRequest::get(RESOURCE)).await
    }

    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn get(&self, id: &str) -> ApiResult<User> {
        self.api
            .fetch(&ApiRequest::get(item_path(RESOURCE, id)?))
            .await
    }

    /// Replaces the user record (`PUT users/{id}`).
    ///
    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn update(&self, id: &str, body: &Value) -> ApiResult<Envelope<Value>> {
        let request = json_body(ApiRequest::put(item_path(RESOURCE, id)?), body)?;
        self.api.call(&request).await
    }

    /// Partial update (`PATCH users/{id}`).
    ///
    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn patch(&self, id: &str, body: &Value) -> ApiResult<Envelope<Value>> {
        let request = json_body(ApiRequest::patch(item_path(RESOURCE, id)?), body)?;
        self.api.call(&request).await
    }
}
