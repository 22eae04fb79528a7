//! Password hashing and session keys.

mod password;
mod session;

pub use password::{hash_password, verify_password, PasswordError};
pub use session::SESSION_TOKEN_KEY;
