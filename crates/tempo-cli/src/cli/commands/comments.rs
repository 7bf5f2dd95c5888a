//! Comment commands.

use anyhow::Result;
use tempo_core::ApiClient;
use tempo_types::NewComment;

use super::{current_user_id, print_envelope};

#[derive(clap::Subcommand)]
pub enum CommentCommands {
    /// Comment on a post as the signed-in user
    Add {
        #[arg(long = "post", value_name = "POST_ID")]
        post_id: String,
        #[arg(long)]
        content: String,
    },
}

pub async fn run(api: &ApiClient, command: CommentCommands) -> Result<()> {
    match command {
        CommentCommands::Add { post_id, content } => {
            let comment = NewComment {
                user_id: current_user_id(api).await?,
                post_id,
                content,
            };
            print_envelope(&api.comments().create(&comment).await?, "Comment added")
        }
    }
}
