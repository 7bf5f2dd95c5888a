//! CLI command handlers.

pub mod auth;
pub mod comments;
pub mod config;
pub mod likes;
pub mod playlists;
pub mod posts;
pub mod songs;
pub mod users;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tempo_core::ApiClient;
use tempo_types::Envelope;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{out}");
    Ok(())
}

/// Prints the server message, then `data` when there is any.
pub fn print_envelope(env: &Envelope<Value>, fallback: &str) -> Result<()> {
    println!("{}", env.message_or(fallback));
    match &env.data {
        Some(data) if !data.is_null() => print_json(data),
        _ => Ok(()),
    }
}

/// Parses a `--json` argument into an object body.
pub fn parse_json_arg(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("--json must be valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("--json must be a JSON object");
    }
    Ok(value)
}

/// The signed-in user's id, required by likes and comments.
pub async fn current_user_id(api: &ApiClient) -> Result<String> {
    let session = api.session().current().await;
    let Some(creds) = session.credentials() else {
        anyhow::bail!("Not logged in. Run 'tempo login' first.");
    };
    creds
        .user_id()
        .map(str::to_string)
        .context("Saved session has no user id. Run 'tempo login' again.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_arg_requires_object() {
        assert_eq!(parse_json_arg(r#"{"name":"x"}"#).unwrap()["name"], "x");
        assert!(parse_json_arg("[1,2]").is_err());
        assert!(parse_json_arg("{oops").is_err());
    }
}
