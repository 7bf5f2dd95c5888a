//! Gateway behavior over real HTTP against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempo_core::api::{ApiClient, ApiRequest, Gateway, HttpTransport, Outcome};
use tempo_core::auth::store::{CredentialStore, FileCredentialStore, hydrate};
use tempo_core::session::{Credentials, SessionHandle};
use tempo_types::SongFields;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn creds() -> Credentials {
    Credentials {
        access_token: "A1".to_string(),
        refresh_token: "R1".to_string(),
        user: json!({ "_id": "u1", "name": "Ada" }),
    }
}

fn client(server: &MockServer, store: Arc<FileCredentialStore>) -> ApiClient {
    let base = Url::parse(&format!("{}/api/", server.uri())).unwrap();
    let session = SessionHandle::new(hydrate(store.as_ref()));
    let transport = HttpTransport::new(Some(Duration::from_secs(5))).unwrap();
    ApiClient::new(Gateway::new(base, transport, session, store))
}

fn saved_store(dir: &tempfile::TempDir) -> Arc<FileCredentialStore> {
    let store = Arc::new(FileCredentialStore::new(dir.path().join("credentials.json")));
    store.save(&creds()).unwrap();
    store
}

fn expired() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({ "success": false, "message": "jwt expired" }))
}

#[tokio::test]
async fn test_expired_token_is_renewed_and_request_replayed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = saved_store(&dir);

    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(expired())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/ref-token"))
        .and(header("Authorization", "Bearer R1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "A2", "refreshToken": "R2" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .and(header("Authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "_id": "s1", "title": "So What" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, store.clone());
    let songs = api.songs().list().await.unwrap();
    assert_eq!(songs[0].title, "So What");

    let stored = store.load().unwrap().unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("A2"));
    assert_eq!(stored.refresh_token.as_deref(), Some("R2"));
    assert!(stored.user.unwrap().contains("Ada"));
}

#[tokio::test]
async fn test_rejected_renewal_clears_saved_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = saved_store(&dir);

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(expired())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/ref-token"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "success": false, "message": "invalid refresh token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, store.clone());
    let (response, outcome) = api.send(&ApiRequest::get("posts")).await.unwrap();

    assert_eq!(outcome, Outcome::LoggedOut);
    assert_eq!(response.status.as_u16(), 401);
    assert_eq!(response.server_message().as_deref(), Some("jwt expired"));
    assert!(!api.session().is_logged_in().await);
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_login_401_is_not_renewed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = saved_store(&dir);

    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "success": false, "message": "Invalid credentials" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/api/users/ref-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server, store.clone());
    let err = tempo_core::auth::login(&api, "ada@example.com", "wrong")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 401: Invalid credentials");
    assert!(api.session().is_logged_in().await);
    assert_eq!(
        store.load().unwrap().unwrap().access_token.as_deref(),
        Some("A1")
    );
}

#[tokio::test]
async fn test_song_upload_sends_multipart_with_audio() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = saved_store(&dir);
    let audio = dir.path().join("so-what.mp3");
    std::fs::write(&audio, b"ID3\x03\x00\x00\x00\x00\x00\x00").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/songs"))
        .and(header("Authorization", "Bearer A1"))
        .and(body_string_contains("name=\"audioUrl\"; filename=\"so-what.mp3\""))
        .and(body_string_contains("So What"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "success": true, "message": "Song created" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, store);
    let upload = tempo_core::api::SongUpload::new(SongFields {
        title: "So What".into(),
        artist: "Miles Davis".into(),
        ..SongFields::default()
    })
    .with_audio_file(&audio)
    .unwrap();

    let env = api.songs().create(&upload).await.unwrap();
    assert_eq!(env.message.as_deref(), Some("Song created"));
}

#[tokio::test]
async fn test_connection_failure_keeps_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = saved_store(&dir);
    let base = Url::parse("http://127.0.0.1:9/api/").unwrap();
    let session = SessionHandle::new(hydrate(store.as_ref()));
    let transport = HttpTransport::new(Some(Duration::from_secs(5))).unwrap();
    let api = ApiClient::new(Gateway::new(base, transport, session, store.clone()));

    assert!(api.songs().list().await.is_err());
    assert!(api.session().is_logged_in().await);
    assert!(store.path().exists());
}
