//! # Account operations
//!
//! Registration, credential checks and session lifecycle. Every function takes the
//! store handle as its first argument; nothing here reaches for a global.
//!
//! A session starts anonymous, becomes authenticated through [`login`] (or
//! [`authenticate`] + [`start_session`]), and returns to anonymous through
//! [`end_session`].

use std::sync::OnceLock;

use store::{AccountStore, Error, Result, SessionStore, SessionToken, User, UserId};

use crate::auth::{hash_password, verify_password};

/// Hash checked against when the email is unknown, so both failures cost one
/// Argon2 verification.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("no such account").ok())
        .as_deref()
}

/// Create an account and return its id.
pub async fn register<S: AccountStore>(store: &S, email: &str, password: &str) -> Result<UserId> {
    if store.find_user_by_email(email).await?.is_some() {
        return Err(Error::DuplicateEmail);
    }

    let password_hash = hash_password(password).map_err(Error::storage)?;
    let id = store.insert_user(email, &password_hash).await?;

    tracing::info!(user_id = id, "registered new account");
    Ok(id)
}

/// Check an email/password pair and return the matching user id.
pub async fn authenticate<S: AccountStore>(
    store: &S,
    email: &str,
    password: &str,
) -> Result<UserId> {
    let Some(user) = store.find_user_by_email(email).await? else {
        if let Some(hash) = dummy_hash() {
            let _ = verify_password(password, hash);
        }
        tracing::warn!("login attempt for unknown email");
        return Err(Error::InvalidCredentials);
    };

    match verify_password(password, &user.password_hash) {
        Ok(true) => Ok(user.id),
        Ok(false) => {
            tracing::warn!(user_id = user.id, "login attempt with wrong password");
            Err(Error::InvalidCredentials)
        }
        Err(e) => {
            tracing::error!(user_id = user.id, "cannot verify password: {}", e);
            Err(Error::InvalidCredentials)
        }
    }
}

/// Issue a session token for an authenticated user.
pub async fn start_session<S: SessionStore>(store: &S, user_id: UserId) -> Result<SessionToken> {
    store.create_session(user_id).await
}

/// [`authenticate`] then [`start_session`].
pub async fn login<S>(store: &S, email: &str, password: &str) -> Result<(UserId, SessionToken)>
where
    S: AccountStore + SessionStore,
{
    let user_id = authenticate(store, email, password).await?;
    let token = start_session(store, user_id).await?;
    tracing::info!(user_id, "user logged in");
    Ok((user_id, token))
}

/// Invalidate a session. Ending an unknown or already ended session succeeds.
pub async fn end_session<S: SessionStore>(store: &S, token: &SessionToken) -> Result<()> {
    store.delete_session(token).await?;
    tracing::info!("session ended");
    Ok(())
}

/// The user a session token belongs to, if it is still valid.
pub async fn current_user<S>(store: &S, token: &SessionToken) -> Result<Option<User>>
where
    S: AccountStore + SessionStore,
{
    match store.resolve_session(token).await? {
        Some(user_id) => store.find_user(user_id).await,
        None => Ok(None),
    }
}
