use serde_json::Value;
use tempo_types::{Envelope, NewPlaylist, Playlist};

use super::{item_path, json_body};
use crate::api::client::ApiClient;
use crate::api::error::ApiResult;
use crate::api::request::ApiRequest;
use crate::api::transport::Transport;

// The backend mounts playlists under the singular path.
const RESOURCE: &str = "playlist";

pub struct Playlists<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> Playlists<'a, T> {
    pub(crate) fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns an error if the request fails or the body does not decode.
    pub async fn list(&self) -> ApiResult<Vec<Playlist>> {
        self.api.fetch(&ApiRequest::get(RESOURCE)).await
    }

    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn get(&self, id: &str) -> ApiResult<Playlist> {
        self.api
            .fetch(&ApiRequest::get(item_path(RESOURCE, id)?))
            .await
    }

    /// # Errors
    /// Returns an error if the request fails.
    pub async fn create(&self, playlist: &NewPlaylist) -> ApiResult<Envelope<Value>> {
        let request = json_body(ApiRequest::post(RESOURCE), playlist)?;
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

    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn delete(&self, id: &str) -> ApiResult<Envelope<Value>> {
        self.api
            .call(&ApiRequest::delete(item_path(RESOURCE, id)?))
            .await
    }
}
