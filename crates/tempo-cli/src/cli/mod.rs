//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tempo_core::api::ApiClient;
use tempo_core::auth::store::FileCredentialStore;
use tempo_core::{config, logging};

mod commands;

use commands::{comments, likes, playlists, posts, songs, users};

const SESSION_EXPIRED_HINT: &str = "Session expired. Run 'tempo login' to sign in again.";

#[derive(Parser)]
#[command(name = "tempo")]
#[command(version)]
#[command(about = "Tempo music library and social feed client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the API base URL from config
    #[arg(long, global = true, env = "TEMPO_BASE_URL", value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in and save the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Request a password reset email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with the emailed reset token and code
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and remove saved credentials
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// User directory
    Users {
        #[command(subcommand)]
        command: users::UserCommands,
    },
    /// Songs in the library
    Songs {
        #[command(subcommand)]
        command: songs::SongCommands,
    },
    /// Playlists
    Playlists {
        #[command(subcommand)]
        command: playlists::PlaylistCommands,
    },
    /// Feed posts
    Posts {
        #[command(subcommand)]
        command: posts::PostCommands,
    },
    /// Likes on posts
    Likes {
        #[command(subcommand)]
        command: likes::LikeCommands,
    },
    /// Comments on posts
    Comments {
        #[command(subcommand)]
        command: comments::CommentCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Save the API base URL to the config file
    SetBaseUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::Config::load().context("load config")?;
    if let Some(url) = cli.base_url.as_deref() {
        config.base_url = url.to_string();
    }
    let _log_guard = logging::init(config.log_level.as_deref());

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli.command, &config).await })
}

fn api_client(config: &config::Config) -> Result<ApiClient> {
    let store = Arc::new(FileCredentialStore::default_location());
    ApiClient::from_config(config, store)
}

async fn dispatch(command: Commands, config: &config::Config) -> Result<()> {
    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetBaseUrl { url } => commands::config::set_base_url(&url),
        },
        Commands::Whoami => commands::auth::whoami(&api_client(config)?).await,
        Commands::Login { email, password } => {
            commands::auth::login(&api_client(config)?, &email, password).await
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let request = tempo_types::RegisterRequest {
                name,
                email,
                password,
                confirm_password,
            };
            commands::auth::register(&api_client(config)?, &request).await
        }
        Commands::ForgotPassword { email } => {
            commands::auth::forgot_password(&api_client(config)?, &email).await
        }
        Commands::ResetPassword {
            token,
            code,
            password,
        } => commands::auth::reset_password(&api_client(config)?, &token, &code, &password).await,
        Commands::Logout => commands::auth::logout(&api_client(config)?).await,

        Commands::Users { command } => {
            let api = api_client(config)?;
            watch_session(&api, users::run(&api, command)).await
        }
        Commands::Songs { command } => {
            let api = api_client(config)?;
            watch_session(&api, songs::run(&api, command)).await
        }
        Commands::Playlists { command } => {
            let api = api_client(config)?;
            watch_session(&api, playlists::run(&api, command)).await
        }
        Commands::Posts { command } => {
            let api = api_client(config)?;
            watch_session(&api, posts::run(&api, command)).await
        }
        Commands::Likes { command } => {
            let api = api_client(config)?;
            watch_session(&api, likes::run(&api, command)).await
        }
        Commands::Comments { command } => {
            let api = api_client(config)?;
            watch_session(&api, comments::run(&api, command)).await
        }
    }
}

/// Runs a resource command and tells the user when the gateway dropped the
/// session along the way.
async fn watch_session(
    api: &ApiClient,
    command: impl Future<Output = Result<()>>,
) -> Result<()> {
    let was_logged_in = api.session().is_logged_in().await;
    let result = command.await;
    if was_logged_in && !api.session().is_logged_in().await {
        tracing::debug!("session cleared during command");
        eprintln!("{SESSION_EXPIRED_HINT}");
    }
    result
}
