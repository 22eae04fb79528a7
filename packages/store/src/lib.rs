pub mod error;
pub mod models;
pub mod repo;

mod memory;
pub use memory::MemoryStore;

pub use error::{Error, Result};
pub use models::{Comment, CommentId, NewComment, SessionToken, Trail, User, UserId};
pub use repo::{AccountStore, CommentStore, SessionStore};
