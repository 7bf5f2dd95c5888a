//! Durable credential storage.
//!
//! Mirrors the browser's `localStorage` layout: three string keys
//! (`accessToken`, `refreshToken`, `user`). The file store keeps them in
//! `<base>/credentials.json` with restricted permissions (0600).
//! Tokens are never logged.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::paths;
use crate::session::{Credentials, Session};

/// Raw persisted keys. Each may be missing independently on disk; only a
/// complete pair hydrates into a session.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// JSON-encoded user identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl StoredCredentials {
    /// Encodes credentials as the three string keys.
    ///
    /// # Errors
    /// Returns an error if the user payload cannot be serialized.
    pub fn from_credentials(creds: &Credentials) -> Result<Self> {
        let user = serde_json::to_string(&creds.user).context("Failed to serialize user")?;
        Ok(Self {
            access_token: Some(creds.access_token.clone()),
            refresh_token: Some(creds.refresh_token.clone()),
            user: Some(user),
        })
    }

    /// Returns credentials only when both tokens are present and non-empty.
    /// An unreadable `user` value degrades to `null` rather than dropping
    /// the session.
    pub fn into_credentials(self) -> Option<Credentials> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let refresh_token = self.refresh_token.filter(|t| !t.is_empty())?;
        let user = self
            .user
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .unwrap_or(Value::Null);
        Some(Credentials {
            access_token,
            refresh_token,
            user,
        })
    }
}

/// Persistence for session credentials.
pub trait CredentialStore: Send + Sync {
    /// Loads persisted keys. `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read or parsed.
    fn load(&self) -> Result<Option<StoredCredentials>>;

    /// Writes all three keys.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, credentials: &Credentials) -> Result<()>;

    /// Removes all three keys together. Returns whether anything was stored.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be removed.
    fn clear(&self) -> Result<bool>;
}

/// Builds the startup session from whatever the store holds.
///
/// An unreadable or corrupt store starts logged out, so a later login can
/// overwrite it and logout can remove it.
pub fn hydrate(store: &dyn CredentialStore) -> Session {
    let stored = match store.load() {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "ignoring unreadable saved credentials");
            None
        }
    };
    let session = stored
        .and_then(StoredCredentials::into_credentials)
        .map_or(Session::LoggedOut, Session::LoggedIn);
    tracing::debug!(logged_in = session.is_logged_in(), "hydrated session");
    session
}

/// File-backed store (`credentials.json`).
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under `TEMPO_HOME`.
    pub fn default_location() -> Self {
        Self::new(paths::credentials_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_restricted(&self, contents: &str) -> Result<()> {
        let path = &self.path;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoredCredentials>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read credentials from {}", self.path.display())
        })?;

        let stored: StoredCredentials = serde_json::from_str(&contents).with_context(|| {
            format!("Failed to parse credentials from {}", self.path.display())
        })?;
        Ok(Some(stored))
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        let stored = StoredCredentials::from_credentials(credentials)?;
        let contents =
            serde_json::to_string_pretty(&stored).context("Failed to serialize credentials")?;
        self.write_restricted(&contents)?;
        tracing::debug!(path = %self.path.display(), "saved credentials");
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "cleared credentials");
        Ok(true)
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `credentials` already stored.
    ///
    /// # Errors
    /// Returns an error if the user payload cannot be serialized.
    pub fn with_credentials(credentials: &Credentials) -> Result<Self> {
        Ok(Self {
            inner: Mutex::new(Some(StoredCredentials::from_credentials(credentials)?)),
        })
    }

    /// Current contents, for assertions.
    pub fn snapshot(&self) -> Option<StoredCredentials> {
        self.with_slot(|slot| slot.clone())
    }

    fn with_slot<R>(&self, f: impl FnOnce(&mut Option<StoredCredentials>) -> R) -> R {
        match self.inner.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredCredentials>> {
        Ok(self.snapshot())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        let stored = StoredCredentials::from_credentials(credentials)?;
        self.with_slot(|slot| *slot = Some(stored));
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        Ok(self.with_slot(|slot| slot.take().is_some()))
    }
}
