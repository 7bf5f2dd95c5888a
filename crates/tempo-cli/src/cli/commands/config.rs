//! Config command handlers.

use anyhow::{Context, Result};
use tempo_core::config;

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn set_base_url(url: &str) -> Result<()> {
    let candidate = config::Config {
        base_url: url.to_string(),
        ..config::Config::default()
    };
    let normalized = candidate.api_base_url()?;

    let config_path = config::paths::config_path();
    config::Config::save_base_url_to(&config_path, normalized.as_str())
        .with_context(|| format!("update config at {}", config_path.display()))?;
    println!("base_url set to {normalized}");
    Ok(())
}
