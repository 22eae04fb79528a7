//! # Storage traits
//!
//! Every operation in the `api` crate is written against these traits rather than a
//! concrete database, so the same logic runs against [`crate::MemoryStore`] in tests
//! and against the Postgres backend in production.
//!
//! | Trait | Table it abstracts |
//! |-------|--------------------|
//! | [`AccountStore`] | `users` |
//! | [`CommentStore`] | `comments` |
//! | [`SessionStore`] | `sessions` |
//!
//! Each method is a single atomic write or read. Futures are `Send` so they can be
//! awaited inside axum handlers.

use std::future::Future;

use crate::error::Result;
use crate::models::{Comment, CommentId, NewComment, SessionToken, Trail, User, UserId};

pub trait AccountStore {
    fn find_user_by_email(&self, email: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    fn find_user(&self, id: UserId) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Insert a user. Fails with `DuplicateEmail` if the email is taken.
    fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<UserId>> + Send;
}

pub trait CommentStore {
    /// Comments for one trail, newest first; equal timestamps list the later insert first.
    fn comments_for_trail(&self, trail: Trail) -> impl Future<Output = Result<Vec<Comment>>> + Send;

    /// Append a comment. The stored timestamp is never earlier than any already stored.
    fn insert_comment(&self, comment: NewComment) -> impl Future<Output = Result<CommentId>> + Send;
}

pub trait SessionStore {
    fn create_session(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<SessionToken>> + Send;

    /// The user behind a live token, refreshing its last-seen time. A token idle for
    /// the store's session TTL or longer is deleted and resolves to `None`.
    fn resolve_session(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = Result<Option<UserId>>> + Send;

    /// Remove a session. Removing an unknown token is not an error.
    fn delete_session(&self, token: &SessionToken) -> impl Future<Output = Result<()>> + Send;
}
