//! Client-safe projections of store models.

mod user;

pub use user::UserInfo;
