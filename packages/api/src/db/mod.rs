//! # Database module — PostgreSQL backend
//!
//! - [`connect`] opens a pool from [`crate::settings::Database`] and runs the embedded
//!   migrations. The pool is returned to the caller, which owns it; there is no
//!   process-wide singleton.
//! - [`PgStore`] implements the `store` traits on top of that pool. Comment inserts
//!   take a transaction-scoped advisory lock so timestamps stay ordered across
//!   connections; the other writes are single statements.
//! - [`MIGRATOR`] embeds `migrations/` (users, comments, sessions and their indexes).

mod pg_store;
mod pool;

pub use pg_store::PgStore;
pub use pool::{connect, MIGRATOR};
