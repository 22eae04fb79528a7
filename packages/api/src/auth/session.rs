//! Session keys.

/// Key under which the cookie session keeps the login [`store::SessionToken`].
pub const SESSION_TOKEN_KEY: &str = "session_token";
