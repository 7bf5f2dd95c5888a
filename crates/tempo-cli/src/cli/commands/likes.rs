//! Like commands.

use anyhow::Result;
use tempo_core::ApiClient;
use tempo_types::NewLike;

use super::{current_user_id, print_envelope};

#[derive(clap::Subcommand)]
pub enum LikeCommands {
    /// Like a post as the signed-in user
    Add {
        #[arg(long = "post", value_name = "POST_ID")]
        post_id: String,
    },
    /// Remove a like
    Remove {
        #[arg(value_name = "LIKE_ID")]
        id: String,
    },
}

pub async fn run(api: &ApiClient, command: LikeCommands) -> Result<()> {
    match command {
        LikeCommands::Add { post_id } => {
            let like = NewLike {
                user_id: current_user_id(api).await?,
                post_id,
            };
            print_envelope(&api.likes().create(&like).await?, "Liked")
        }
        LikeCommands::Remove { id } => print_envelope(&api.likes().delete(&id).await?, "Unliked"),
    }
}
