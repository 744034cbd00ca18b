//! In-process cache backed by mini-moka.

use super::traits::{CacheBackend, CacheConfig};
use crate::error::Result;
use mini_moka::sync::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone)]
struct MemoryEntry {
    value: Arc<Vec<u8>>,
    expires_at: Instant,
}

/// In-memory cache backend.
///
/// mini-moka only supports a cache-wide TTL, so per-entry expiry is tracked
/// alongside the value and checked on read.
pub struct MemoryCache {
    entries: Cache<String, MemoryEntry>,
}

impl MemoryCache {
    /// Create a cache with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&CacheConfig::default())
    }

    /// Create a cache with custom configuration.
    pub fn with_config(config: &CacheConfig) -> Self {
        Self {
            entries: Cache::builder()
                .time_to_live(config.default_ttl)
                .max_capacity(config.max_capacity)
                .build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = key.to_string();
        match self.entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.to_vec())),
            Some(_) => {
                self.entries.invalidate(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: Arc::new(value.to_vec()),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        let live = self
            .entries
            .get(&key)
            .map(|e| e.expires_at > Instant::now())
            .unwrap_or(false);
        self.entries.invalidate(&key);
        Ok(live)
    }

    fn clear(&self) -> Result<()> {
        self.entries.invalidate_all();
        debug!("Cleared in-memory cache");
        Ok(())
    }
}
