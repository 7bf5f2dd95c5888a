//! Feed post commands.

use anyhow::Result;
use tempo_core::ApiClient;
use tempo_types::NewPost;

use super::{parse_json_arg, print_envelope, print_json};

#[derive(clap::Subcommand)]
pub enum PostCommands {
    /// List posts
    List,
    /// Show one post
    Show {
        #[arg(value_name = "POST_ID")]
        id: String,
    },
    /// Publish a post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Replace a post's fields
    Update {
        #[arg(value_name = "POST_ID")]
        id: String,
        /// JSON object body
        #[arg(long)]
        json: String,
    },
    /// Update some of a post's fields
    Patch {
        #[arg(value_name = "POST_ID")]
        id: String,
        /// JSON object body
        #[arg(long)]
        json: String,
    },
}

pub async fn run(api: &ApiClient, command: PostCommands) -> Result<()> {
    let posts = api.posts();
    match command {
        PostCommands::List => print_json(&posts.list().await?),
        PostCommands::Show { id } => print_json(&posts.get(&id).await?),
        PostCommands::Create { title, content } => {
            let env = posts.create(&NewPost { title, content }).await?;
            print_envelope(&env, "Post created")
        }
        PostCommands::Update { id, json } => {
            let env = posts.update(&id, &parse_json_arg(&json)?).await?;
            print_envelope(&env, "Post updated")
        }
        PostCommands::Patch { id, json } => {
            let env = posts.patch(&id, &parse_json_arg(&json)?).await?;
            print_envelope(&env, "Post updated")
        }
    }
}
