//! Playlist commands.

use anyhow::Result;
use tempo_core::ApiClient;
use tempo_types::NewPlaylist;

use super::{parse_json_arg, print_envelope, print_json};

#[derive(clap::Subcommand)]
pub enum PlaylistCommands {
    /// List playlists
    List,
    /// Show one playlist
    Show {
        #[arg(value_name = "PLAYLIST_ID")]
        id: String,
    },
    /// Create a playlist
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Song id to include (repeatable)
        #[arg(long = "song", value_name = "SONG_ID")]
        songs: Vec<String>,
    },
    /// Replace a playlist's fields
    Update {
        #[arg(value_name = "PLAYLIST_ID")]
        id: String,
        /// JSON object body
        #[arg(long)]
        json: String,
    },
    /// Update some of a playlist's fields
    Patch {
        #[arg(value_name = "PLAYLIST_ID")]
        id: String,
        /// JSON object body
        #[arg(long)]
        json: String,
    },
    /// Delete a playlist
    Delete {
        #[arg(value_name = "PLAYLIST_ID")]
        id: String,
    },
}

pub async fn run(api: &ApiClient, command: PlaylistCommands) -> Result<()> {
    let playlists = api.playlists();
    match command {
        PlaylistCommands::List => print_json(&playlists.list().await?),
        PlaylistCommands::Show { id } => print_json(&playlists.get(&id).await?),
        PlaylistCommands::Create {
            name,
            description,
            songs,
        } => {
            let playlist = NewPlaylist {
                name,
                description,
                songs,
            };
            print_envelope(&playlists.create(&playlist).await?, "Playlist created")
        }
        PlaylistCommands::Update { id, json } => {
            let env = playlists.update(&id, &parse_json_arg(&json)?).await?;
            print_envelope(&env, "Playlist updated")
        }
        PlaylistCommands::Patch { id, json } => {
            let env = playlists.patch(&id, &parse_json_arg(&json)?).await?;
            print_envelope(&env, "Playlist updated")
        }
        PlaylistCommands::Delete { id } => {
            print_envelope(&playlists.delete(&id).await?, "Playlist deleted")
        }
    }
}
