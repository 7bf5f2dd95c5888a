use std::path::Path;

use serde_json::Value;
use tempo_types::{Envelope, Song, SongFields};

use super::{item_path, json_body};
use crate::api::client::ApiClient;
use crate::api::error::{ApiError, ApiResult, check_id};
use crate::api::request::{ApiRequest, FilePart, MultipartForm};
use crate::api::transport::Transport;

const RESOURCE: &str = "songs";
const AUDIO_FIELD: &str = "audioUrl";

/// Song form as uploaded: text fields plus an optional audio file.
#[derive(Debug, Clone, Default)]
pub struct SongUpload {
    pub fields: SongFields,
    pub audio: Option<FilePart>,
}

impl SongUpload {
    pub fn new(fields: SongFields) -> Self {
        Self {
            fields,
            audio: None,
        }
    }

    /// Attaches the audio file at `path`.
    ///
    /// # Errors
    /// Returns [`ApiError::Invalid`] if the file cannot be read.
    pub fn with_audio_file(mut self, path: &Path) -> ApiResult<Self> {
        let part = FilePart::from_path(path).map_err(|e| {
            ApiError::Invalid(format!("Failed to read audio file {}: {e}", path.display()))
        })?;
        self.audio = Some(part);
        Ok(self)
    }

    /// Builds the multipart body. `id` is included when editing.
    pub fn to_form(&self, id: Option<&str>) -> MultipartForm {
        let mut form = MultipartForm::new();
        for (name, value) in self.fields.pairs() {
            form = form.text(name, value);
        }
        if let Some(id) = id {
            form = form.text("id", id);
        }
        if let Some(audio) = &self.audio {
            form = form.file(AUDIO_FIELD, audio.clone());
        }
        form
    }
}

pub struct Songs<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> Songs<'a, T> {
    pub(crate) fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns an error if the request fails or the body does not decode.
    pub async fn list(&self) -> ApiResult<Vec<Song>> {
        self.api.fetch(&ApiRequest::get(RESOURCE)).await
    }

    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn get(&self, id: &str) -> ApiResult<Song> {
        self.api
            .fetch(&ApiRequest::get(item_path(RESOURCE, id)?))
            .await
    }

    /// Uploads a new song (`POST songs`, multipart).
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn create(&self, upload: &SongUpload) -> ApiResult<Envelope<Value>> {
        let request = ApiRequest::post(RESOURCE).with_multipart(upload.to_form(None));
        self.api.call(&request).await
    }

    /// Replaces a song (`PUT songs/{id}`, multipart with `id`).
    ///
    /// # Errors
    /// Returns an error if the id is invalid or the request fails.
    pub async fn update(&self, id: &str, upload: &SongUpload) -> ApiResult<Envelope<Value>> {
        let id = check_id(id)?;
        let request =
            ApiRequest::put(format!("{RESOURCE}/{id}")).with_multipart(upload.to_form(Some(id)));
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
