//! Music library records: songs and playlists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A song in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub lyrics: String,
    /// Where the uploaded audio is served from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Text fields of the song upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongFields {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub lyrics: String,
}

impl SongFields {
    /// Form field name/value pairs in upload order.
    pub fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("title", &self.title),
            ("artist", &self.artist),
            ("album", &self.album),
            ("genre", &self.genre),
            ("lyrics", &self.lyrics),
        ]
    }
}

/// Playlist entries come back either populated or as bare ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SongRef {
    Id(String),
    Song(Box<Song>),
}

impl SongRef {
    pub fn id(&self) -> &str {
        match self {
            SongRef::Id(id) => id,
            SongRef::Song(song) => &song.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub songs: Vec<SongRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST playlist`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPlaylist {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Song ids.
    #[serde(default)]
    pub songs: Vec<String>,
}
