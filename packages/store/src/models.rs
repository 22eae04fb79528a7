//! # Domain models for accounts, sessions and trail comments
//!
//! ## Types
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`Trail`] | One of the fixed hiking routes a comment can be attached to. Parsed from its canonical name (`"Laza-Kuzun"`, `"Shahdag"`, `"Xinaliq"`, `"Transcaucas"`); anything else is [`Error::UnknownTrail`]. |
//! | [`User`] | A registered account row: surrogate id, email exactly as entered, Argon2 PHC hash. |
//! | [`SessionToken`] | Opaque random token bound to one user while they are logged in. |
//! | [`NewComment`] | What an insert needs: trail, author, trimmed content, server timestamp. |
//! | [`Comment`] | A stored comment as read back for display, with the author's email resolved. |

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub type UserId = i64;
pub type CommentId = i64;

/// The fixed set of trails that accept comments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trail {
    LazaKuzun,
    Shahdag,
    Xinaliq,
    Transcaucas,
}

impl Trail {
    pub const ALL: [Trail; 4] = [
        Trail::LazaKuzun,
        Trail::Shahdag,
        Trail::Xinaliq,
        Trail::Transcaucas,
    ];

    /// Canonical name, used as the URL path segment and the stored column value.
    pub fn name(&self) -> &'static str {
        match self {
            Trail::LazaKuzun => "Laza-Kuzun",
            Trail::Shahdag => "Shahdag",
            Trail::Xinaliq => "Xinaliq",
            Trail::Transcaucas => "Transcaucas",
        }
    }

    /// Heading shown on the trail page.
    pub fn title(&self) -> &'static str {
        match self {
            Trail::LazaKuzun => "Laza to Kuzun",
            Trail::Shahdag => "Shahdag",
            Trail::Xinaliq => "Xinaliq village",
            Trail::Transcaucas => "Transcaucasian Trail",
        }
    }
}

impl FromStr for Trail {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Trail::ALL
            .into_iter()
            .find(|trail| trail.name() == s)
            .ok_or_else(|| Error::UnknownTrail(s.to_string()))
    }
}

impl fmt::Display for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Full user record. Never leaves the server.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Token identifying a logged-in session. Serialized as the bare string inside the
/// cookie session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// A fresh random token.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewComment {
    pub trail: Trail,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment as listed on a trail page.
#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub trail: Trail,
    pub user_id: UserId,
    /// Author's email at read time, for display.
    pub author_email: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
