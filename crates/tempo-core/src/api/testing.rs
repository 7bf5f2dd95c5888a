//! In-process transport double for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use super::gateway::Gateway;
use super::request::{ApiRequest, ApiResponse};
use super::transport::{Transport, TransportError};
use crate::auth::store::CredentialStore;
use crate::session::SessionHandle;

pub(crate) const BASE_URL: &str = "http://api.test/api/";

#[derive(Debug, Clone)]
pub(crate) struct Sent {
    pub url: Url,
    pub request: ApiRequest,
}

impl Sent {
    pub fn authorization(&self) -> Option<&str> {
        self.request.header("Authorization")
    }
}

/// Replays a fixed script of responses and records every request.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    sent: Mutex<Vec<Sent>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &Value) -> Self {
        self.respond_raw(status, &body.to_string())
    }

    pub fn respond_raw(self, status: u16, body: &str) -> Self {
        let response = ApiResponse::new(
            StatusCode::from_u16(status).unwrap(),
            body.as_bytes().to_vec(),
        );
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(self, err: TransportError) -> Self {
        self.script.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|s| format!("{} {}", s.request.method, s.url.path()))
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, url: &Url, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.sent.lock().unwrap().push(Sent {
            url: url.clone(),
            request: request.clone(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::connect("script exhausted")))
    }
}

pub(crate) fn gateway(
    transport: ScriptedTransport,
    session: SessionHandle,
    store: Arc<dyn CredentialStore>,
) -> Gateway<ScriptedTransport> {
    Gateway::new(Url::parse(BASE_URL).unwrap(), transport, session, store)
}
