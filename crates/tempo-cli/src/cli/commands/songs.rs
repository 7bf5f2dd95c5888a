//! Song library commands.

use std::path::PathBuf;

use anyhow::Result;
use tempo_core::ApiClient;
use tempo_core::api::SongUpload;
use tempo_types::SongFields;

use super::{parse_json_arg, print_envelope, print_json};

/// Text fields of the song form.
#[derive(clap::Args, Debug, Clone)]
pub struct SongArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    artist: String,
    #[arg(long, default_value = "")]
    album: String,
    #[arg(long, default_value = "")]
    genre: String,
    #[arg(long, default_value = "")]
    lyrics: String,
    /// Audio file to upload
    #[arg(long, value_name = "PATH")]
    audio: Option<PathBuf>,
}

impl SongArgs {
    fn into_upload(self) -> Result<SongUpload> {
        let upload = SongUpload::new(SongFields {
            title: self.title,
            artist: self.artist,
            album: self.album,
            genre: self.genre,
            lyrics: self.lyrics,
        });
        match self.audio {
            Some(path) => Ok(upload.with_audio_file(&path)?),
            None => Ok(upload),
        }
    }
}

#[derive(clap::Subcommand)]
pub enum SongCommands {
    /// List songs
    List,
    /// Show one song
    Show {
        #[arg(value_name = "SONG_ID")]
        id: String,
    },
    /// Upload a new song
    Create {
        #[command(flatten)]
        song: SongArgs,
    },
    /// Replace a song's fields (and optionally its audio)
    Update {
        #[arg(value_name = "SONG_ID")]
        id: String,
        #[command(flatten)]
        song: SongArgs,
    },
    /// Update some of a song's fields
    Patch {
        #[arg(value_name = "SONG_ID")]
        id: String,
        /// JSON object body
        #[arg(long)]
        json: String,
    },
    /// Delete a song
    Delete {
        #[arg(value_name = "SONG_ID")]
        id: String,
    },
}

pub async fn run(api: &ApiClient, command: SongCommands) -> Result<()> {
    let songs = api.songs();
    match command {
        SongCommands::List => print_json(&songs.list().await?),
        SongCommands::Show { id } => print_json(&songs.get(&id).await?),
        SongCommands::Create { song } => {
            let env = songs.create(&song.into_upload()?).await?;
            print_envelope(&env, "Song created")
        }
        SongCommands::Update { id, song } => {
            let env = songs.update(&id, &song.into_upload()?).await?;
            print_envelope(&env, "Song updated")
        }
        SongCommands::Patch { id, json } => {
            let env = songs.patch(&id, &parse_json_arg(&json)?).await?;
            print_envelope(&env, "Song updated")
        }
        SongCommands::Delete { id } => {
            let env = songs.delete(&id).await?;
            print_envelope(&env, "Song deleted")
        }
    }
}
