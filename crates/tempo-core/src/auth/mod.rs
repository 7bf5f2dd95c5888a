//! Sign-in flows: login, registration, password recovery and logout.
//!
//! All calls go through the gateway. The `users` POST endpoints are exempt
//! from token renewal, so a 401 here is reported as-is.

pub mod store;

use std::fmt;

use serde::Serialize;
use tempo_types::{
    ForgotPasswordRequest, LoginData, LoginRequest, RegisterRequest, ResetPasswordRequest,
};

use crate::api::{ApiClient, ApiError, ApiRequest, Transport};
use crate::session::Credentials;

pub const LOGIN_PATH: &str = "users/login";
pub const REGISTER_PATH: &str = "users";
pub const FORGOT_PASSWORD_PATH: &str = "users/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "users/reset-password";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Server refused or the call failed
    Api(ApiError),
    /// Password and confirmation differ
    PasswordMismatch,
    /// Login succeeded but the tokens were blank
    MissingTokens,
    /// Credentials could not be written or removed
    Store(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Api(ApiError::Rejected(msg)) => write!(f, "{msg}"),
            AuthError::Api(e) => write!(f, "{e}"),
            AuthError::PasswordMismatch => write!(f, "Passwords do not match"),
            AuthError::MissingTokens => write!(f, "Login response did not include tokens"),
            AuthError::Store(msg) => write!(f, "Failed to update saved credentials: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(e: ApiError) -> Self {
        AuthError::Api(e)
    }
}

fn post<B: Serialize>(path: &str, body: &B) -> Result<ApiRequest, AuthError> {
    ApiRequest::post(path)
        .with_json(body)
        .map_err(|e| AuthError::Api(ApiError::Invalid(format!("Failed to encode body: {e}"))))
}

/// Signs in, then installs and persists the session.
///
/// On any failure the session and the store are left untouched.
///
/// # Errors
/// Returns the server's message on rejection, or a store error.
pub async fn login<T: Transport>(
    api: &ApiClient<T>,
    email: &str,
    password: &str,
) -> Result<Credentials, AuthError> {
    let request = post(
        LOGIN_PATH,
        &LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        },
    )?;
    let data: LoginData = api.fetch(&request).await?;
    if data.access_token.trim().is_empty() || data.refresh_token.trim().is_empty() {
        return Err(AuthError::MissingTokens);
    }

    let credentials = Credentials::from(data);
    api.gateway()
        .store()
        .save(&credentials)
        .map_err(|e| AuthError::Store(format!("{e:#}")))?;
    api.session().set(credentials.clone()).await;
    tracing::info!(user_id = credentials.user_id(), "logged in");
    Ok(credentials)
}

/// Creates an account. Does not sign in. Returns the server's message.
///
/// # Errors
/// Returns [`AuthError::PasswordMismatch`] before any network call when the
/// confirmation differs, otherwise the server's rejection.
pub async fn register<T: Transport>(
    api: &ApiClient<T>,
    request: &RegisterRequest,
) -> Result<String, AuthError> {
    if !request.passwords_match() {
        return Err(AuthError::PasswordMismatch);
    }
    let env = api
        .call::<serde_json::Value>(&post(REGISTER_PATH, request)?)
        .await?;
    Ok(env.message_or("Registration successful").to_string())
}

/// Requests a password reset email.
///
/// # Errors
/// Returns the server's rejection.
pub async fn forgot_password<T: Transport>(
    api: &ApiClient<T>,
    email: &str,
) -> Result<String, AuthError> {
    let body = ForgotPasswordRequest {
        email: email.to_string(),
    };
    let env = api
        .call::<serde_json::Value>(&post(FORGOT_PASSWORD_PATH, &body)?)
        .await?;
    Ok(env.message_or("Password reset email sent").to_string())
}

/// Sets a new password using the emailed reset token and code. The token
/// is sent as the bearer credential in place of any session token.
///
/// # Errors
/// Returns the server's rejection.
pub async fn reset_password<T: Transport>(
    api: &ApiClient<T>,
    token: &str,
    code: &str,
    password: &str,
) -> Result<String, AuthError> {
    let body = ResetPasswordRequest {
        code: code.to_string(),
        password: password.to_string(),
    };
    let request = post(RESET_PASSWORD_PATH, &body)?.with_bearer(token);
    let env = api.call::<serde_json::Value>(&request).await?;
    Ok(env.message_or("Password updated").to_string())
}

/// Clears the session and the stored credentials together.
/// Returns whether a session was present.
///
/// # Errors
/// Returns [`AuthError::Store`] if the stored credentials cannot be removed;
/// the in-memory session is cleared regardless.
pub async fn logout<T: Transport>(api: &ApiClient<T>) -> Result<bool, AuthError> {
    let had_session = api.session().clear().await;
    let had_stored = api
        .gateway()
        .store()
        .clear()
        .map_err(|e| AuthError::Store(format!("{e:#}")))?;
    tracing::info!(had_session, "logged out");
    Ok(had_session || had_stored)
}
