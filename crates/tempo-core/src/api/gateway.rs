//! Authenticated request gateway.
//!
//! Every API call goes through [`Gateway::execute`]:
//!
//! 1. The current access token is attached as a bearer credential, unless
//!    the caller already set `Authorization`.
//! 2. A 401 on a non-exempt request triggers one renewal exchange
//!    (`GET users/ref-token` carrying the refresh token).
//! 3. On renewal success both tokens are replaced, persisted, and the
//!    original request is replayed once. The replay's response is final.
//! 4. On renewal failure, or with no refresh token, the session is cleared
//!    and the original 401 is returned.
//!
//! `POST users/*` (login, registration, password reset) never triggers
//! renewal, and neither does a request whose caller supplied its own
//! `Authorization`.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tempo_types::TokenPair;
use url::Url;

use super::request::{ApiRequest, ApiResponse};
use super::transport::{HttpTransport, Transport, TransportError, TransportErrorKind};
use crate::auth::store::CredentialStore;
use crate::session::SessionHandle;

/// Renewal endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "users/ref-token";

const EXEMPT_RESOURCE: &str = "users";

/// Terminal state of one `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First response was not a 401
    Passed,
    /// 401 on an exempt or caller-authorized request; session untouched
    Exempt,
    /// Tokens renewed; the response is from the replay
    Replayed,
    /// Renewal impossible or rejected; session cleared
    LoggedOut,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed => write!(f, "passed"),
            Outcome::Exempt => write!(f, "exempt"),
            Outcome::Replayed => write!(f, "replayed"),
            Outcome::LoggedOut => write!(f, "logged_out"),
        }
    }
}

/// Whether a 401 on this request must be returned without renewal.
pub fn is_refresh_exempt(request: &ApiRequest) -> bool {
    request.method == Method::POST && request.resource() == EXEMPT_RESOURCE
}

pub struct Gateway<T = HttpTransport> {
    base_url: Url,
    transport: T,
    session: SessionHandle,
    store: Arc<dyn CredentialStore>,
}

impl<T: Transport> Gateway<T> {
    pub fn new(
        base_url: Url,
        transport: T,
        session: SessionHandle,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            base_url,
            transport,
            session,
            store,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `request`, repairing a single access-token expiry.
    ///
    /// # Errors
    /// Returns the transport error of the original request or the replay.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.execute_traced(request)
            .await
            .map(|(response, _)| response)
    }

    /// Like [`execute`](Self::execute), also reporting which path was taken.
    ///
    /// # Errors
    /// Returns the transport error of the original request or the replay.
    pub async fn execute_traced(
        &self,
        request: &ApiRequest,
    ) -> Result<(ApiResponse, Outcome), TransportError> {
        let url = self.resolve(&request.path)?;
        let access_token = self.session.access_token().await;
        let outbound = authorize(request, access_token.as_deref());

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            authenticated = outbound.has_authorization(),
            "sending request"
        );
        let response = self.transport.send(&url, &outbound).await?;

        if !response.is_unauthorized() {
            tracing::debug!(status = response.status.as_u16(), "request passed");
            return Ok((response, Outcome::Passed));
        }

        if is_refresh_exempt(request) {
            tracing::debug!(path = %request.path, "401 on exempt request");
            return Ok((response, Outcome::Exempt));
        }

        if request.has_authorization() {
            tracing::debug!(path = %request.path, "401 on caller-authorized request");
            return Ok((response, Outcome::Exempt));
        }

        let Some(refresh_token) = self.session.refresh_token().await else {
            tracing::info!(path = %request.path, "401 without refresh token");
            self.logout().await;
            return Ok((response, Outcome::LoggedOut));
        };

        let Some(tokens) = self.renew(&refresh_token).await else {
            self.logout().await;
            return Ok((response, Outcome::LoggedOut));
        };

        let credentials = self.session.rotate(tokens).await;
        if let Err(e) = self.store.save(&credentials) {
            tracing::warn!(error = %format!("{e:#}"), "failed to persist renewed credentials");
        }
        tracing::info!(
            path = %request.path,
            renewed = true,
            "access token renewed, replaying request"
        );

        let replay = authorize(request, Some(&credentials.access_token));
        let response = self.transport.send(&url, &replay).await?;
        tracing::debug!(status = response.status.as_u16(), "replay finished");
        Ok((response, Outcome::Replayed))
    }

    fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| {
                TransportError::new(
                    TransportErrorKind::Request,
                    format!("Invalid request path '{path}': {e}"),
                )
            })
    }

    /// One renewal exchange. `None` on any failure.
    async fn renew(&self, refresh_token: &str) -> Option<TokenPair> {
        let request = ApiRequest::get(REFRESH_PATH).with_bearer(refresh_token);
        let url = self.resolve(REFRESH_PATH).ok()?;

        match self.transport.send(&url, &request).await {
            Ok(response) if response.is_success() => {
                let tokens = parse_token_pair(&response);
                if tokens.is_none() {
                    tracing::warn!("renewal response carried no usable token pair");
                }
                tokens
            }
            Ok(response) => {
                tracing::warn!(status = response.status.as_u16(), "token renewal rejected");
                None
            }
            Err(e) => {
                tracing::warn!(kind = %e.kind, error = %e, "token renewal failed");
                None
            }
        }
    }

    async fn logout(&self) {
        let had_session = self.session.clear().await;
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %format!("{e:#}"), "failed to clear stored credentials");
        }
        tracing::info!(had_session, "session cleared");
    }
}

fn authorize(request: &ApiRequest, access_token: Option<&str>) -> ApiRequest {
    match access_token {
        Some(token) if !request.has_authorization() => request.clone().with_bearer(token),
        _ => request.clone(),
    }
}

/// Accepts `{accessToken, refreshToken}` at top level or inside the
/// envelope's `data`. An envelope with `success: false` is a failure.
fn parse_token_pair(response: &ApiResponse) -> Option<TokenPair> {
    let body: Value = response.json().ok()?;
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    let candidate = if body.get("accessToken").is_some() {
        &body
    } else {
        body.get("data")?
    };
    let pair = TokenPair::deserialize(candidate).ok()?;
    pair.is_complete().then_some(pair)
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use serde_json::json;

    use super::*;
    use crate::api::testing::{ScriptedTransport, gateway};
    use crate::auth::store::{MemoryCredentialStore, StoredCredentials};
    use crate::session::{Credentials, Session};

    fn creds(access: &str, refresh: &str) -> Credentials {
        Credentials {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            user: json!({ "_id": "u1", "name": "Ada" }),
        }
    }

    fn logged_in() -> (SessionHandle, Arc<MemoryCredentialStore>) {
        let c = creds("A1", "R1");
        let store = Arc::new(MemoryCredentialStore::with_credentials(&c).unwrap());
        (SessionHandle::logged_in(c), store)
    }

    fn unauthorized() -> Value {
        json!({ "success": false, "message": "jwt expired" })
    }

    #[tokio::test]
    async fn test_non_401_passes_through_with_token() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new()
            .respond(200, &json!({ "success": true, "data": [] }))
            .respond(404, &json!({ "success": false, "message": "nope" }));
        let gw = gateway(transport, session.clone(), store.clone());

        let (resp, outcome) = gw.execute_traced(&ApiRequest::get("songs")).await.unwrap();
        assert_eq!(resp.status.as_u16(), 200);
        assert_eq!(outcome, Outcome::Passed);

        let (resp, outcome) = gw
            .execute_traced(&ApiRequest::get("songs/missing"))
            .await
            .unwrap();
        assert_eq!(resp.status.as_u16(), 404);
        assert_eq!(outcome, Outcome::Passed);

        let sent = gw.transport().sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].url.as_str(), "http://api.test/api/songs");
        assert_eq!(sent[0].authorization(), Some("Bearer A1"));
        assert_eq!(session.current().await, Session::LoggedIn(creds("A1", "R1")));
        assert!(store.snapshot().is_some());
    }

    #[tokio::test]
    async fn test_valid_token_twice_never_refreshes() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new()
            .respond(200, &json!({ "data": 1 }))
            .respond(200, &json!({ "data": 1 }));
        let gw = gateway(transport, session.clone(), store.clone());

        let request = ApiRequest::get("playlist");
        gw.execute(&request).await.unwrap();
        gw.execute(&request).await.unwrap();

        assert_eq!(
            gw.transport().paths(),
            vec!["GET /api/playlist", "GET /api/playlist"]
        );
        assert_eq!(session.current().await, Session::LoggedIn(creds("A1", "R1")));
    }

    #[tokio::test]
    async fn test_logged_out_sends_no_authorization() {
        let transport = ScriptedTransport::new().respond(200, &json!({ "data": [] }));
        let gw = gateway(
            transport,
            SessionHandle::default(),
            Arc::new(MemoryCredentialStore::new()),
        );

        gw.execute(&ApiRequest::get("posts")).await.unwrap();
        assert_eq!(gw.transport().sent()[0].authorization(), None);
    }

    #[tokio::test]
    async fn test_caller_authorization_header_wins() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new().respond(200, &json!({ "success": true }));
        let gw = gateway(transport, session, store);

        let request = ApiRequest::post("users/reset-password").with_bearer("reset-token");
        gw.execute(&request).await.unwrap();

        assert_eq!(
            gw.transport().sent()[0].authorization(),
            Some("Bearer reset-token")
        );
    }

    #[tokio::test]
    async fn test_caller_authorized_401_is_not_renewed() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new().respond(401, &unauthorized());
        let gw = gateway(transport, session.clone(), store.clone());

        let request = ApiRequest::get("songs").with_bearer("other-token");
        let (resp, outcome) = gw.execute_traced(&request).await.unwrap();

        assert_eq!(resp.status.as_u16(), 401);
        assert_eq!(outcome, Outcome::Exempt);
        assert_eq!(gw.transport().paths(), vec!["GET /api/songs"]);
        assert_eq!(session.current().await, Session::LoggedIn(creds("A1", "R1")));
        assert!(store.snapshot().is_some());
    }

    #[tokio::test]
    async fn test_post_users_with_query_is_renewed() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new()
            .respond(401, &unauthorized())
            .respond(200, &json!({ "accessToken": "A2", "refreshToken": "R2" }))
            .respond(200, &json!({ "success": true }));
        let gw = gateway(transport, session, store);

        let (_, outcome) = gw
            .execute_traced(&ApiRequest::post("users?x=1"))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Replayed);
        assert_eq!(gw.transport().sent()[2].authorization(), Some("Bearer A2"));
    }

    #[tokio::test]
    async fn test_exempt_401_is_returned_untouched() {
        for path in ["users", "users/login", "/users/forgot-password"] {
            let (session, store) = logged_in();
            let transport = ScriptedTransport::new().respond(401, &unauthorized());
            let gw = gateway(transport, session.clone(), store.clone());

            let (resp, outcome) = gw
                .execute_traced(&ApiRequest::post(path))
                .await
                .unwrap();

            assert_eq!(resp.status.as_u16(), 401, "{path}");
            assert_eq!(resp.json::<Value>().unwrap(), unauthorized());
            assert_eq!(outcome, Outcome::Exempt);
            assert_eq!(gw.transport().sent().len(), 1);
            assert!(session.is_logged_in().await);
            assert!(store.snapshot().is_some());
        }
    }

    #[tokio::test]
    async fn test_refresh_success_rotates_persists_and_replays_once() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new()
            .respond(401, &unauthorized())
            .respond(200, &json!({ "accessToken": "A2", "refreshToken": "R2" }))
            .respond(200, &json!({ "success": true, "data": { "_id": "s1" } }));
        let gw = gateway(transport, session.clone(), store.clone());

        let request = ApiRequest::put("songs/s1").with_json_value(json!({ "title": "Blue" }));
        let (resp, outcome) = gw.execute_traced(&request).await.unwrap();

        assert_eq!(outcome, Outcome::Replayed);
        assert_eq!(resp.status.as_u16(), 200);

        let sent = gw.transport().sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].authorization(), Some("Bearer A1"));
        assert_eq!(sent[1].request.method, Method::GET);
        assert_eq!(sent[1].url.as_str(), "http://api.test/api/users/ref-token");
        assert_eq!(sent[1].authorization(), Some("Bearer R1"));
        assert_eq!(sent[2].authorization(), Some("Bearer A2"));
        assert_eq!(sent[2].request.body, request.body);
        assert_eq!(sent[2].url, sent[0].url);

        assert_eq!(session.current().await, Session::LoggedIn(creds("A2", "R2")));
        let stored = store.snapshot().unwrap();
        assert_eq!(stored.access_token.as_deref(), Some("A2"));
        assert_eq!(stored.refresh_token.as_deref(), Some("R2"));
        assert!(stored.user.unwrap().contains("Ada"));
    }

    #[tokio::test]
    async fn test_refresh_accepts_envelope_data() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new()
            .respond(401, &unauthorized())
            .respond(
                200,
                &json!({ "success": true, "data": { "accessToken": "A2", "refreshToken": "R2" } }),
            )
            .respond(200, &json!({ "success": true }));
        let gw = gateway(transport, session.clone(), store);

        let (_, outcome) = gw.execute_traced(&ApiRequest::get("songs")).await.unwrap();
        assert_eq!(outcome, Outcome::Replayed);
        assert_eq!(session.access_token().await.as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_no_refresh_token_logs_out_without_network() {
        let c = creds("stale", "stale");
        let store = Arc::new(MemoryCredentialStore::with_credentials(&c).unwrap());
        let session = SessionHandle::default();
        let transport = ScriptedTransport::new().respond(401, &unauthorized());
        let gw = gateway(transport, session.clone(), store.clone());

        let (resp, outcome) = gw.execute_traced(&ApiRequest::get("songs")).await.unwrap();

        assert_eq!(resp.status.as_u16(), 401);
        assert_eq!(outcome, Outcome::LoggedOut);
        assert_eq!(gw.transport().sent().len(), 1);
        assert!(!session.is_logged_in().await);
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_refresh_rejected_returns_original_401() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new()
            .respond(401, &unauthorized())
            .respond(401, &json!({ "success": false, "message": "refresh expired" }));
        let gw = gateway(transport, session.clone(), store.clone());

        let (resp, outcome) = gw.execute_traced(&ApiRequest::get("posts")).await.unwrap();

        assert_eq!(outcome, Outcome::LoggedOut);
        assert_eq!(resp.json::<Value>().unwrap(), unauthorized());
        assert_eq!(gw.transport().sent().len(), 2);
        assert_eq!(session.current().await, Session::LoggedOut);
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_tokens_logs_out() {
        let bodies = [
            json!({ "success": false, "data": { "accessToken": "A2", "refreshToken": "R2" } }),
            json!({ "success": true, "data": { "accessToken": "A2" } }),
            json!({ "accessToken": "", "refreshToken": "R2" }),
            json!({ "success": true }),
        ];
        for body in bodies {
            let (session, store) = logged_in();
            let transport = ScriptedTransport::new()
                .respond(401, &unauthorized())
                .respond(200, &body);
            let gw = gateway(transport, session.clone(), store.clone());

            let (resp, outcome) = gw.execute_traced(&ApiRequest::get("likes")).await.unwrap();
            assert_eq!(outcome, Outcome::LoggedOut, "{body}");
            assert_eq!(resp.status.as_u16(), 401);
            assert!(!session.is_logged_in().await);
            assert!(store.snapshot().is_none());
        }
    }

    #[tokio::test]
    async fn test_refresh_transport_failure_logs_out() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new()
            .respond(401, &unauthorized())
            .fail(TransportError::timeout("Request timed out"));
        let gw = gateway(transport, session.clone(), store);

        let (resp, outcome) = gw.execute_traced(&ApiRequest::get("songs")).await.unwrap();
        assert_eq!(resp.status.as_u16(), 401);
        assert_eq!(outcome, Outcome::LoggedOut);
        assert!(!session.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_original_transport_failure_leaves_session() {
        let (session, store) = logged_in();
        let transport =
            ScriptedTransport::new().fail(TransportError::connect("Connection failed"));
        let gw = gateway(transport, session.clone(), store.clone());

        let err = gw.execute(&ApiRequest::get("songs")).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Connect);
        assert_eq!(session.current().await, Session::LoggedIn(creds("A1", "R1")));
        assert!(store.snapshot().is_some());
    }

    #[tokio::test]
    async fn test_replay_401_is_final() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new()
            .respond(401, &unauthorized())
            .respond(200, &json!({ "accessToken": "A2", "refreshToken": "R2" }))
            .respond(401, &json!({ "message": "still no" }));
        let gw = gateway(transport, session.clone(), store);

        let (resp, outcome) = gw.execute_traced(&ApiRequest::get("songs")).await.unwrap();

        assert_eq!(outcome, Outcome::Replayed);
        assert_eq!(resp.json::<Value>().unwrap(), json!({ "message": "still no" }));
        assert_eq!(gw.transport().sent().len(), 3);
        assert_eq!(session.access_token().await.as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_replay_transport_failure_is_surfaced() {
        let (session, store) = logged_in();
        let transport = ScriptedTransport::new()
            .respond(401, &unauthorized())
            .respond(200, &json!({ "accessToken": "A2", "refreshToken": "R2" }))
            .fail(TransportError::connect("Connection reset"));
        let gw = gateway(transport, session.clone(), store);

        let err = gw.execute(&ApiRequest::get("songs")).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Connect);
        assert!(session.is_logged_in().await);
    }

    struct ReadOnlyStore;

    impl CredentialStore for ReadOnlyStore {
        fn load(&self) -> anyhow::Result<Option<StoredCredentials>> {
            Ok(None)
        }

        fn save(&self, _: &Credentials) -> anyhow::Result<()> {
            bail!("read-only filesystem")
        }

        fn clear(&self) -> anyhow::Result<bool> {
            bail!("read-only filesystem")
        }
    }

    #[tokio::test]
    async fn test_store_write_failure_still_replays() {
        let session = SessionHandle::logged_in(creds("A1", "R1"));
        let transport = ScriptedTransport::new()
            .respond(401, &unauthorized())
            .respond(200, &json!({ "accessToken": "A2", "refreshToken": "R2" }))
            .respond(200, &json!({ "success": true }));
        let gw = gateway(transport, session.clone(), Arc::new(ReadOnlyStore));

        let (resp, outcome) = gw.execute_traced(&ApiRequest::get("songs")).await.unwrap();
        assert_eq!(outcome, Outcome::Replayed);
        assert_eq!(resp.status.as_u16(), 200);
        assert_eq!(session.access_token().await.as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_store_clear_failure_still_logs_out() {
        let session = SessionHandle::logged_in(creds("A1", "R1"));
        let transport = ScriptedTransport::new()
            .respond(401, &unauthorized())
            .respond(403, &json!({ "message": "invalid refresh token" }));
        let gw = gateway(transport, session.clone(), Arc::new(ReadOnlyStore));

        let (_, outcome) = gw.execute_traced(&ApiRequest::get("songs")).await.unwrap();
        assert_eq!(outcome, Outcome::LoggedOut);
        assert!(!session.is_logged_in().await);
    }

    #[test]
    fn test_is_refresh_exempt() {
        assert!(is_refresh_exempt(&ApiRequest::post("users")));
        assert!(is_refresh_exempt(&ApiRequest::post("users/login")));
        assert!(is_refresh_exempt(&ApiRequest::post("/users/reset-password")));
        assert!(!is_refresh_exempt(&ApiRequest::get("users")));
        assert!(!is_refresh_exempt(&ApiRequest::put("users/u1")));
        assert!(!is_refresh_exempt(&ApiRequest::post("songs")));
        assert!(!is_refresh_exempt(&ApiRequest::post("usersx")));
        assert!(!is_refresh_exempt(&ApiRequest::post("users?x=1")));
        assert!(is_refresh_exempt(&ApiRequest::post("users/login?next=1")));
    }

    #[test]
    fn test_parse_token_pair_shapes() {
        let top = ApiResponse::new(
            reqwest::StatusCode::OK,
            r#"{"accessToken":"a","refreshToken":"r"}"#,
        );
        assert_eq!(
            parse_token_pair(&top),
            Some(TokenPair {
                access_token: "a".into(),
                refresh_token: "r".into()
            })
        );

        let garbage = ApiResponse::new(reqwest::StatusCode::OK, "<html>");
        assert_eq!(parse_token_pair(&garbage), None);
    }
}
