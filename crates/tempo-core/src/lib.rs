//! Tempo core: session-aware access to the music library and social feed
//! backend.
//!
//! - [`api`] sends requests through the token-renewing [`api::Gateway`]
//! - [`auth`] holds the sign-in flows and durable credential storage
//! - [`session`] is the shared in-memory session
//! - [`config`] and [`logging`] cover the ambient setup

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
pub mod session;

pub use api::{ApiClient, ApiError, Gateway, Outcome};
pub use session::{Credentials, Session, SessionHandle};
