use serde_json::Value;
use tempo_types::{Envelope, NewPost, Page, Post};

use super::{item_path, json_body};
use crate::api::client::ApiClient;
use crate::api::error::ApiResult;
use crate::api::request::ApiRequest;
use crate::api::transport::Transport;

const RESOURCE: &str = "posts";

/// Social feed posts. The listing is paged (`data: { total, data }`).
pub struct Posts<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> Posts<'a, T> {
    pub(crate) fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns an error if the request fails or the body does not decode.
    pub async fn list(&self) -> ApiResult<Page<Post>> {
        self.api.fetch(&ApiRequest::get(RESOURCE)).await
    }

    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn get(&self, id: &str) -> ApiResult<Post> {
        self.api
            .fetch(&ApiRequest::get(item_path(RESOURCE, id)?))
            .await
    }

    /// # Errors
    /// Returns an error if the request fails.
    pub async fn create(&self, post: &NewPost) -> ApiResult<Envelope<Value>> {
        let request = json_body(ApiRequest::post(RESOURCE), post)?;
        self.api.call(&request).await
    }

    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn update(&self, id: &str, body: &Value) -> ApiResult<Envelope<Value>> {
        let request = json_body(ApiRequest::put(item_path(RESOURCE, id)?), body)?;
        self.api.call(&request).await
    }

    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn patch(&self, id: &str, body: &Value) -> ApiResult<Envelope<Value>> {
        let request = json_body(ApiRequest::patch(item_path(RESOURCE, id)?), body)?;
        self.api.call(&request).await
    }
}
