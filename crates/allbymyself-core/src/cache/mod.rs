//! Cache layer for singleton records.
//!
//! Backends implement [`CacheBackend`]; records talk to them through a
//! [`CacheClient`], which owns the connect/disconnect lifecycle so the cache is
//! an injected dependency rather than process-global state.
//!
//! - [`MemoryCache`]: in-process TTL cache
//! - [`SqliteCache`]: file-backed cache shared between processes

mod client;
mod memory;
mod sqlite;
mod traits;

pub use client::CacheClient;
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;
pub use traits::{CacheBackend, CacheConfig};
