use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};
use store::{
    AccountStore, Comment, CommentId, CommentStore, Error, NewComment, Result, SessionStore,
    SessionToken, Trail, User, UserId,
};

/// Advisory lock key held while a comment is inserted.
const COMMENT_INSERT_LOCK: i64 = 0x7472_6169_6c73;

/// Postgres-backed store.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
    session_ttl: Duration,
}

impl PgStore {
    /// Sessions idle for `session_ttl` or longer no longer resolve.
    pub fn new(pool: PgPool, session_ttl: Duration) -> Self {
        Self { pool, session_ttl }
    }

    fn session_ttl_secs(&self) -> f64 {
        self.session_ttl.num_milliseconds() as f64 / 1000.0
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CommentRow {
    id: i64,
    trail: String,
    user_id: i64,
    author_email: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = Error;

    fn try_from(row: CommentRow) -> Result<Self> {
        let trail: Trail = row.trail.parse().map_err(|_| {
            Error::storage(format!("comment {} has unknown trail {}", row.id, row.trail))
        })?;
        Ok(Comment {
            id: row.id,
            trail,
            user_id: row.user_id,
            author_email: row.author_email,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl AccountStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::storage)?;

        Ok(row.map(User::from))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, password_hash, created_at FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::storage)?;

        Ok(row.map(User::from))
    }

    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<UserId> {
        let row: (i64,) =
            sqlx::query_as("INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id")
                .bind(email)
                .bind(password_hash)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    // Lost a race with a concurrent registration
                    if is_unique_violation(&e) {
                        Error::DuplicateEmail
                    } else {
                        Error::storage(e)
                    }
                })?;

        Ok(row.0)
    }
}

impl CommentStore for PgStore {
    async fn comments_for_trail(&self, trail: Trail) -> Result<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.trail, c.user_id, u.email AS author_email, c.content, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.trail = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(trail.name())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::storage)?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentId> {
        let mut tx = self.pool.begin().await.map_err(Error::storage)?;

        // Inserts run one at a time, so MAX below sees every earlier commit
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(COMMENT_INSERT_LOCK)
            .execute(&mut *tx)
            .await
            .map_err(Error::storage)?;

        // Clamp to the newest stored timestamp so created_at never goes backwards
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO comments (content, user_id, trail, created_at)
            SELECT $1, $2, $3, GREATEST($4, COALESCE(MAX(created_at), $4))
            FROM comments
            RETURNING id
            "#,
        )
        .bind(&comment.content)
        .bind(comment.user_id)
        .bind(comment.trail.name())
        .bind(comment.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::storage)?;

        tx.commit().await.map_err(Error::storage)?;
        Ok(row.0)
    }
}

impl SessionStore for PgStore {
    async fn create_session(&self, user_id: UserId) -> Result<SessionToken> {
        let token = SessionToken::generate();
        sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
            .bind(token.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::storage)?;

        Ok(token)
    }

    async fn resolve_session(&self, token: &SessionToken) -> Result<Option<UserId>> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE sessions SET last_seen_at = NOW()
            WHERE token = $1 AND last_seen_at > NOW() - make_interval(secs => $2)
            RETURNING user_id
            "#,
        )
        .bind(token.as_str())
        .bind(self.session_ttl_secs())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::storage)?;

        if row.is_none() {
            // Unknown or idle; drop this token and any other idle ones
            let swept = sqlx::query(
                "DELETE FROM sessions WHERE last_seen_at <= NOW() - make_interval(secs => $1)",
            )
            .bind(self.session_ttl_secs())
            .execute(&self.pool)
            .await
            .map_err(Error::storage)?;
            if swept.rows_affected() > 0 {
                tracing::debug!(count = swept.rows_affected(), "removed idle sessions");
            }
        }

        Ok(row.map(|(user_id,)| user_id))
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token.as_str())
            .execute(&self.pool)
            .await
            .map_err(Error::storage)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MIGRATOR;
    use chrono::TimeZone;
    use sqlx::postgres::PgPoolOptions;

    async fn test_pool() -> PgPool {
        let url = std::env::var("TRAILS_TEST_DATABASE_URL")
            .expect("TRAILS_TEST_DATABASE_URL must point at a scratch database");
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(&url)
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    async fn test_user(store: &PgStore) -> UserId {
        let email = format!("{}@example.com", SessionToken::generate().as_str());
        store.insert_user(&email, "hash").await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "needs TRAILS_TEST_DATABASE_URL"]
    async fn test_concurrent_inserts_never_go_backwards() {
        let store = PgStore::new(test_pool().await, Duration::days(7));
        let user = test_user(&store).await;

        // Each request carries an earlier clock than the one before it
        let base = Utc.timestamp_opt(4_000_000_000, 0).unwrap();
        let inserts: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_comment(NewComment {
                            trail: Trail::Shahdag,
                            user_id: user,
                            content: format!("comment {i}"),
                            created_at: base - Duration::seconds(i),
                        })
                        .await
                })
            })
            .collect();
        for insert in inserts {
            insert.await.unwrap().unwrap();
        }

        let stamps: Vec<(DateTime<Utc>,)> =
            sqlx::query_as("SELECT created_at FROM comments ORDER BY id")
                .fetch_all(&store.pool)
                .await
                .unwrap();
        assert!(stamps.windows(2).all(|pair| pair[0].0 <= pair[1].0));
    }

    #[tokio::test]
    #[ignore = "needs TRAILS_TEST_DATABASE_URL"]
    async fn test_idle_sessions_expire_and_are_removed() {
        let pool = test_pool().await;
        let live = PgStore::new(pool.clone(), Duration::days(7));
        let user = test_user(&live).await;

        let token = live.create_session(user).await.unwrap();
        assert_eq!(live.resolve_session(&token).await.unwrap(), Some(user));

        let expired = PgStore::new(pool, Duration::zero());
        assert_eq!(expired.resolve_session(&token).await.unwrap(), None);

        // The idle row is gone, so a longer TTL cannot revive it
        assert_eq!(live.resolve_session(&token).await.unwrap(), None);
    }
}
