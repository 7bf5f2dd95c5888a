//! Process-wide session state.
//!
//! A session is either logged out or holds both tokens plus the user
//! identity; there is no partial state. Every write replaces the whole value
//! under the lock, so concurrent readers never see mixed tokens.

use std::sync::Arc;

use serde_json::Value;
use tempo_types::{LoginData, TokenPair};
use tokio::sync::RwLock;

/// Tokens and identity of a logged-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    /// Opaque identity payload as returned by login.
    pub user: Value,
}

impl Credentials {
    /// The user's `_id`, when the identity payload carries one.
    pub fn user_id(&self) -> Option<&str> {
        self.user
            .get("_id")
            .or_else(|| self.user.get("id"))
            .and_then(Value::as_str)
    }
}

impl From<LoginData> for Credentials {
    fn from(data: LoginData) -> Self {
        Self {
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            user: data.user,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    LoggedOut,
    LoggedIn(Credentials),
}

impl Session {
    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            Session::LoggedOut => None,
            Session::LoggedIn(creds) => Some(creds),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Session::LoggedIn(_))
    }
}

/// Cheap-to-clone handle to the shared session.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    pub fn logged_in(credentials: Credentials) -> Self {
        Self::new(Session::LoggedIn(credentials))
    }

    /// Snapshot of the current session.
    pub async fn current(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.inner.read().await.is_logged_in()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .credentials()
            .map(|c| c.access_token.clone())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .credentials()
            .map(|c| c.refresh_token.clone())
    }

    pub async fn user(&self) -> Option<Value> {
        self.inner
            .read()
            .await
            .credentials()
            .map(|c| c.user.clone())
    }

    pub async fn set(&self, credentials: Credentials) {
        *self.inner.write().await = Session::LoggedIn(credentials);
    }

    /// Installs a renewed token pair, keeping the current user identity.
    ///
    /// If the session was cleared in the meantime the pair is still
    /// installed with a null identity. Returns the credentials now in place.
    pub async fn rotate(&self, tokens: TokenPair) -> Credentials {
        let mut guard = self.inner.write().await;
        let user = guard
            .credentials()
            .map(|c| c.user.clone())
            .unwrap_or(Value::Null);
        let credentials = Credentials {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
        };
        *guard = Session::LoggedIn(credentials.clone());
        credentials
    }

    /// Clears the session. Returns whether a session was present.
    pub async fn clear(&self) -> bool {
        let mut guard = self.inner.write().await;
        let was_logged_in = guard.is_logged_in();
        *guard = Session::LoggedOut;
        was_logged_in
    }
}
