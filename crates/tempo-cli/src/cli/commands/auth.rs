//! Session command handlers.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Result;
use serde_json::Value;
use tempo_core::ApiClient;
use tempo_core::auth;
use tempo_core::config::paths;
use tempo_types::RegisterRequest;

fn display_name(user: &Value) -> &str {
    ["name", "email", "_id"]
        .iter()
        .find_map(|key| user.get(*key).and_then(Value::as_str))
        .unwrap_or("unknown user")
}

fn read_password() -> Result<String> {
    if io::stdin().is_terminal() {
        print!("Password: ");
        io::stdout().flush()?;
    }
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let password = input.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }
    Ok(password)
}

pub async fn login(api: &ApiClient, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_password()?,
    };
    let credentials = auth::login(api, email, &password).await?;

    println!("✓ Logged in as {}", display_name(&credentials.user));
    println!(
        "  Credentials saved to: {}",
        paths::credentials_path().display()
    );
    Ok(())
}

pub async fn register(api: &ApiClient, request: &RegisterRequest) -> Result<()> {
    let message = auth::register(api, request).await?;
    println!("{message}");
    println!("Run 'tempo login --email {}' to sign in.", request.email);
    Ok(())
}

pub async fn forgot_password(api: &ApiClient, email: &str) -> Result<()> {
    println!("{}", auth::forgot_password(api, email).await?);
    Ok(())
}

pub async fn reset_password(
    api: &ApiClient,
    token: &str,
    code: &str,
    password: &str,
) -> Result<()> {
    println!("{}", auth::reset_password(api, token, code, password).await?);
    Ok(())
}

pub async fn logout(api: &ApiClient) -> Result<()> {
    if auth::logout(api).await? {
        println!("✓ Logged out");
        println!(
            "  Credentials removed from: {}",
            paths::credentials_path().display()
        );
    } else {
        println!("Not logged in (no credentials found).");
    }
    Ok(())
}

pub async fn whoami(api: &ApiClient) -> Result<()> {
    match api.session().user().await {
        Some(user) if !user.is_null() => super::print_json(&user),
        Some(_) => {
            println!("Logged in (no user details saved)");
            Ok(())
        }
        None => {
            println!("Not logged in");
            Ok(())
        }
    }
}
