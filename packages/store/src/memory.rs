use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};
use crate::models::{Comment, CommentId, NewComment, SessionToken, Trail, User, UserId};
use crate::repo::{AccountStore, CommentStore, SessionStore};

/// Days a session may sit idle before it stops resolving, unless overridden.
const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    comments: Vec<StoredComment>,
    sessions: HashMap<SessionToken, SessionEntry>,
}

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    user_id: UserId,
    last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: CommentId,
    comment: NewComment,
}

/// In-memory store for tests and for running without a database.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    session_ttl: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: Arc::default(),
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions idle for `ttl` or longer no longer resolve.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| Error::storage("memory store lock poisoned"))
    }

    /// Number of stored comments across all trails.
    #[cfg(any(test, feature = "test-support"))]
    pub fn comment_count(&self) -> usize {
        self.lock().map(|t| t.comments.len()).unwrap_or_default()
    }

    /// Number of session rows, live or not yet swept.
    #[cfg(any(test, feature = "test-support"))]
    pub fn session_count(&self) -> usize {
        self.lock().map(|t| t.sessions.len()).unwrap_or_default()
    }
}

impl AccountStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<UserId> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(Error::DuplicateEmail);
        }
        let id = tables.users.len() as UserId + 1;
        tables.users.push(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }
}

impl CommentStore for MemoryStore {
    async fn comments_for_trail(&self, trail: Trail) -> Result<Vec<Comment>> {
        let tables = self.lock()?;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|stored| stored.comment.trail == trail)
            .map(|stored| Comment {
                id: stored.id,
                trail: stored.comment.trail,
                user_id: stored.comment.user_id,
                author_email: tables
                    .users
                    .iter()
                    .find(|u| u.id == stored.comment.user_id)
                    .map(|u| u.email.clone())
                    .unwrap_or_default(),
                content: stored.comment.content.clone(),
                created_at: stored.comment.created_at,
            })
            .collect();
        comments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(comments)
    }

    async fn insert_comment(&self, mut comment: NewComment) -> Result<CommentId> {
        let mut tables = self.lock()?;
        if !tables.users.iter().any(|u| u.id == comment.user_id) {
            return Err(Error::storage(format!(
                "comment author {} does not exist",
                comment.user_id
            )));
        }
        if let Some(latest) = tables.comments.iter().map(|c| c.comment.created_at).max() {
            comment.created_at = comment.created_at.max(latest);
        }
        let id = tables.comments.len() as CommentId + 1;
        tables.comments.push(StoredComment { id, comment });
        Ok(id)
    }
}

impl SessionStore for MemoryStore {
    async fn create_session(&self, user_id: UserId) -> Result<SessionToken> {
        let token = SessionToken::generate();
        let entry = SessionEntry {
            user_id,
            last_seen: Utc::now(),
        };
        self.lock()?.sessions.insert(token.clone(), entry);
        Ok(token)
    }

    async fn resolve_session(&self, token: &SessionToken) -> Result<Option<UserId>> {
        let now = Utc::now();
        let ttl = self.session_ttl;
        let mut tables = self.lock()?;

        // Sweep every idle session, not only the one asked about
        tables
            .sessions
            .retain(|_, entry| now - entry.last_seen < ttl);

        Ok(tables.sessions.get_mut(token).map(|entry| {
            entry.last_seen = now;
            entry.user_id
        }))
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<()> {
        self.lock()?.sessions.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_comment(trail: Trail, user_id: UserId, content: &str, secs: i64) -> NewComment {
        NewComment {
            trail,
            user_id,
            content: content.to_string(),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let store = MemoryStore::new();

        assert!(store.find_user_by_email("a@b.c").await.unwrap().is_none());

        let id = store.insert_user("a@b.c", "hash").await.unwrap();
        let user = store.find_user_by_email("a@b.c").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.password_hash, "hash");
        assert_eq!(store.find_user(id).await.unwrap(), Some(user));

        // Emails are case-sensitive
        assert!(store.find_user_by_email("A@b.c").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert_user("a@b.c", "hash").await.unwrap();
        assert_eq!(
            store.insert_user("a@b.c", "other").await,
            Err(Error::DuplicateEmail)
        );
    }

    #[tokio::test]
    async fn test_comments_newest_first_per_trail() {
        let store = MemoryStore::new();
        let user = store.insert_user("hiker@example.com", "hash").await.unwrap();

        store
            .insert_comment(new_comment(Trail::Shahdag, user, "A", 1))
            .await
            .unwrap();
        store
            .insert_comment(new_comment(Trail::Shahdag, user, "B", 2))
            .await
            .unwrap();
        store
            .insert_comment(new_comment(Trail::Xinaliq, user, "C", 3))
            .await
            .unwrap();

        let shahdag = store.comments_for_trail(Trail::Shahdag).await.unwrap();
        let contents: Vec<_> = shahdag.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["B", "A"]);
        assert!(shahdag.iter().all(|c| c.author_email == "hiker@example.com"));

        assert!(store
            .comments_for_trail(Trail::Transcaucas)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_equal_timestamps_list_later_insert_first() {
        let store = MemoryStore::new();
        let user = store.insert_user("hiker@example.com", "hash").await.unwrap();

        for content in ["first", "second", "third"] {
            store
                .insert_comment(new_comment(Trail::LazaKuzun, user, content, 10))
                .await
                .unwrap();
        }

        let contents: Vec<_> = store
            .comments_for_trail(Trail::LazaKuzun)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_timestamps_never_go_backwards() {
        let store = MemoryStore::new();
        let user = store.insert_user("hiker@example.com", "hash").await.unwrap();

        store
            .insert_comment(new_comment(Trail::Shahdag, user, "late", 100))
            .await
            .unwrap();
        store
            .insert_comment(new_comment(Trail::Shahdag, user, "skewed", 50))
            .await
            .unwrap();

        let comments = store.comments_for_trail(Trail::Shahdag).await.unwrap();
        assert_eq!(comments[0].content, "skewed");
        assert_eq!(comments[0].created_at, comments[1].created_at);
    }

    #[tokio::test]
    async fn test_comment_requires_existing_author() {
        let store = MemoryStore::new();
        let result = store
            .insert_comment(new_comment(Trail::Shahdag, 42, "ghost", 1))
            .await;
        assert!(matches!(result, Err(Error::StorageFailure(_))));
        assert_eq!(store.comment_count(), 0);
    }

    #[tokio::test]
    async fn test_sessions() {
        let store = MemoryStore::new();
        let user = store.insert_user("a@b.c", "hash").await.unwrap();

        let token = store.create_session(user).await.unwrap();
        assert_eq!(store.resolve_session(&token).await.unwrap(), Some(user));

        store.delete_session(&token).await.unwrap();
        assert_eq!(store.resolve_session(&token).await.unwrap(), None);

        // Deleting again is fine
        store.delete_session(&token).await.unwrap();
    }

    #[tokio::test]
    async fn test_sessions_within_ttl_keep_resolving() {
        let store = MemoryStore::new().with_session_ttl(Duration::hours(1));
        let user = store.insert_user("a@b.c", "hash").await.unwrap();

        let token = store.create_session(user).await.unwrap();
        for _ in 0..3 {
            assert_eq!(store.resolve_session(&token).await.unwrap(), Some(user));
        }
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire_and_are_removed() {
        let store = MemoryStore::new().with_session_ttl(Duration::zero());
        let user = store.insert_user("a@b.c", "hash").await.unwrap();

        let first = store.create_session(user).await.unwrap();
        let second = store.create_session(user).await.unwrap();
        assert_eq!(store.session_count(), 2);

        assert_eq!(store.resolve_session(&first).await.unwrap(), None);
        // The other idle session is swept at the same time
        assert_eq!(store.session_count(), 0);
        assert_eq!(store.resolve_session(&second).await.unwrap(), None);
    }
}
