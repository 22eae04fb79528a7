//! # User projection for pages
//!
//! [`store::User`] carries the password hash and must stay on the server side of
//! every handler. [`UserInfo`] is what pages render: the id and email, nothing else.

use store::{User, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub id: UserId,
    pub email: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

impl UserInfo {
    /// Name shown in page headers. Accounts only have an email.
    pub fn display_name(&self) -> &str {
        &self.email
    }
}
