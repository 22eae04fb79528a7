//! # Trail comments
//!
//! Anyone may read a trail's comments; writing one needs a live session.
//! [`add_comment`] validates in a fixed order (trail, then session, then content) and
//! touches the store only once every check has passed, so a rejected submission
//! never leaves a row behind.

use chrono::Utc;
use store::{
    Comment, CommentId, CommentStore, Error, NewComment, Result, SessionStore, SessionToken, Trail,
};

/// All comments on the trail named `trail`, newest first.
pub async fn list_comments<S: CommentStore>(store: &S, trail: &str) -> Result<Vec<Comment>> {
    comments_on(store, trail.parse()?).await
}

/// [`list_comments`] for an already parsed trail.
pub async fn comments_on<S: CommentStore>(store: &S, trail: Trail) -> Result<Vec<Comment>> {
    store.comments_for_trail(trail).await
}

/// Post a comment as the user behind `session`.
pub async fn add_comment<S>(
    store: &S,
    session: Option<&SessionToken>,
    trail: &str,
    content: &str,
) -> Result<CommentId>
where
    S: CommentStore + SessionStore,
{
    let trail: Trail = trail.parse()?;

    let Some(token) = session else {
        return Err(Error::Unauthenticated);
    };
    let Some(user_id) = store.resolve_session(token).await? else {
        return Err(Error::Unauthenticated);
    };

    let content = content.trim();
    if content.is_empty() {
        return Err(Error::EmptyContent);
    }

    let id = store
        .insert_comment(NewComment {
            trail,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        })
        .await?;

    tracing::info!(comment_id = id, user_id, %trail, "comment added");
    Ok(id)
}
