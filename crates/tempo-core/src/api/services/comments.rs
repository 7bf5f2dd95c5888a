use serde_json::Value;
use tempo_types::{Envelope, NewComment};

use super::json_body;
use crate::api::client::ApiClient;
use crate::api::error::ApiResult;
use crate::api::request::ApiRequest;
use crate::api::transport::Transport;

const RESOURCE: &str = "comments";

pub struct Comments<'a, T> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> Comments<'a, T> {
    pub(crate) fn new(api: &'a ApiClient<T>) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns an error if the request fails.
    pub async fn create(&self, comment: &NewComment) -> ApiResult<Envelope<Value>> {
        let request = json_body(ApiRequest::post(RESOURCE), comment)?;
        self.api.call(&request).await
    }
}
