//! User directory commands.

use anyhow::Result;
use tempo_core::ApiClient;

use super::{parse_json_arg, print_envelope, print_json};

#[derive(clap::Subcommand)]
pub enum UserCommands {
    /// List users
    List,
    /// Show one user
    Show {
        #[arg(value_name = "USER_ID")]
        id: String,
    },
    /// Replace a user's fields
    Update {
        #[arg(value_name = "USER_ID")]
        id: String,
        /// JSON object body
        #[arg(long)]
        json: String,
    },
    /// Update some of a user's fields
    Patch {
        #[arg(value_name = "USER_ID")]
        id: String,
        /// JSON object body
        #[arg(long)]
        json: String,
    },
}

pub async fn run(api: &ApiClient, command: UserCommands) -> Result<()> {
    let users = api.users();
    match command {
        UserCommands::List => print_json(&users.list().await?),
        UserCommands::Show { id } => print_json(&users.get(&id).await?),
        UserCommands::Update { id, json } => {
            let env = users.update(&id, &parse_json_arg(&json)?).await?;
            print_envelope(&env, "User updated")
        }
        UserCommands::Patch { id, json } => {
            let env = users.patch(&id, &parse_json_arg(&json)?).await?;
            print_envelope(&env, "User updated")
        }
    }
}
