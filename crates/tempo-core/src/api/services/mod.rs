//! Per-resource views over [`ApiClient`](super::ApiClient).
//!
//! Each view borrows the client, builds the request for one endpoint and
//! decodes the envelope. Every call goes through the gateway.

mod comments;
mod likes;
mod playlists;
mod posts;
mod songs;
mod users;

pub use comments::Comments;
pub use likes::Likes;
pub use playlists::Playlists;
pub use posts::Posts;
pub use songs::{SongUpload, Songs};
pub use users::Users;

use super::error::{ApiResult, check_id};

fn item_path(resource: &str, id: &str) -> ApiResult<String> {
    Ok(format!("{resource}/{}", check_id(id)?))
}

fn json_body<B: serde::Serialize + ?Sized>(
    request: super::ApiRequest,
    body: &B,
) -> ApiResult<super::ApiRequest> {
    request
        .with_json(body)
        .map_err(|e| super::ApiError::Invalid(format!("Failed to encode request body: {e}")))
}
