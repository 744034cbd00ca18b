//! Cache backend trait and configuration.

use crate::config::CacheSettings;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for cache behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// TTL applied to every entry written through a [`CacheClient`](super::CacheClient).
    pub default_ttl: Duration,
    /// Maximum number of entries held by in-memory backends.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: CacheSettings::DEFAULT_TTL,
            max_capacity: CacheSettings::MEMORY_MAX_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Config with a custom TTL and the default capacity.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            default_ttl: ttl,
            ..Self::default()
        }
    }
}

/// Key-value cache backend.
///
/// All operations are synchronous to match rusqlite's API. Values are opaque
/// bytes; callers own the encoding.
pub trait CacheBackend: Send + Sync {
    /// Get cached data by key.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set cached data with TTL, overwriting any existing entry.
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Delete a key. Returns whether a live entry was removed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Remove every entry.
    fn clear(&self) -> Result<()>;
}
