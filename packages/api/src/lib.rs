//! # API crate — account and trail-comment operations
//!
//! Everything the web layer calls lives here, written against the storage traits
//! from the `store` crate so the same code runs on Postgres and in memory.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`accounts`] | `register`, `authenticate`, `login`, `end_session`, `current_user` |
//! | [`comments`] | `list_comments`, `add_comment` |
//! | [`auth`] | Argon2id password hashing, cookie-session keys |
//! | [`db`] | Postgres pool, migrations and the [`db::PgStore`] backend |
//! | [`models`] | Client-safe projections (`UserInfo`) |
//! | [`settings`] | Layered configuration (defaults, `trails.toml`, `TRAILS_*` env) |
//!
//! The store handle is always an explicit argument. Authenticated operations take the
//! caller's [`store::SessionToken`] explicitly as well; the web layer pulls it out of
//! the cookie session and hands it in.

pub mod accounts;
pub mod auth;
pub mod comments;
pub mod db;
pub mod models;
pub mod settings;

pub use models::UserInfo;
pub use settings::Settings;

use store::{AccountStore, CommentStore, SessionStore};

/// Everything a request handler needs from a storage backend.
pub trait Backend: AccountStore + CommentStore + SessionStore + Clone + Send + Sync + 'static {}

impl<T> Backend for T where T: AccountStore + CommentStore + SessionStore + Clone + Send + Sync + 'static {}
