//! Wire types for the Tempo backend (users, music library, social feed).
//!
//! The backend speaks camelCase JSON with Mongo-style `_id` keys and wraps
//! every payload in an [`Envelope`].

pub mod auth;
pub mod envelope;
pub mod music;
pub mod social;
pub mod user;

pub use auth::{
    ForgotPasswordRequest, LoginData, LoginRequest, RegisterRequest, ResetPasswordRequest,
    TokenPair,
};
pub use envelope::{Envelope, Page};
pub use music::{NewPlaylist, Playlist, Song, SongFields, SongRef};
pub use social::{Comment, Like, NewComment, NewLike, NewPost, Post};
pub use user::User;
