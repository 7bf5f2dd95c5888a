use serde_json::Value;
use tempo_types::{Envelope, NewLike};

use super::{item_path, json_body};
use crate::api::client::ApiClient;
use crate::api::error::ApiResult;
use crate::api::request::ApiRequest;
use crate::api::transport::Transport;

const RESOURCE: &str = "likes";

pub struct Likes<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> Likes<'a, T> {
    pub(crate) fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns an error if the request fails.
    pub async fn create(&self, like: &NewLike) -> ApiResult<Envelope<Value>> {
        let request = json_body(ApiRequest::post(RESOURCE), like)?;
        self.api.call(&request).await
    }

    /// Removes a like by its own id.
    ///
    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn delete(&self, id: &str) -> ApiResult<Envelope<Value>> {
        self.api
            .call(&ApiRequest::delete(item_path(RESOURCE, id)?))
            .await
    }
}
