//! Persistence for singleton rows and the admin action log.
//!
//! Rows are JSON documents addressed by `(model label, id)`. The store knows
//! nothing about the fixed identity; [`SingletonRepository`](crate::SingletonRepository)
//! always passes it in.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ActionFlag, LogEntry, NewLogEntry, SingletonStore};
