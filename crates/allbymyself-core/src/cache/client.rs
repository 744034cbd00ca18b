//! Cache client with an explicit connection lifecycle.

use super::traits::{CacheBackend, CacheConfig};
use crate::error::{Result, SingletonError};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info};

/// Cloneable handle to a cache backend.
///
/// All clones share the same connection slot, so disconnecting one handle
/// disconnects every repository built from it. Operations on a disconnected
/// client fail with [`SingletonError::CacheDisconnected`].
#[derive(Clone)]
pub struct CacheClient {
    backend: Arc<RwLock<Option<Arc<dyn CacheBackend>>>>,
    ttl: Duration,
}

impl CacheClient {
    /// Create a disconnected client.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            backend: Arc::new(RwLock::new(None)),
            ttl: config.default_ttl,
        }
    }

    /// Create a client already connected to `backend`.
    pub fn connected(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        let client = Self::new(config);
        client.install(Some(backend));
        client
    }

    /// Attach a backend, replacing any current one.
    pub fn connect(&self, backend: Arc<dyn CacheBackend>) {
        self.install(Some(backend));
        info!("Cache client connected");
    }

    /// Detach the backend. Returns whether one was attached.
    pub fn disconnect(&self) -> bool {
        let was_connected = self.install(None);
        if was_connected {
            info!("Cache client disconnected");
        }
        was_connected
    }

    pub fn is_connected(&self) -> bool {
        self.backend.read().map(|b| b.is_some()).unwrap_or(false)
    }

    /// TTL applied to every write.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.backend()?.get(key)?;
        debug!(key, hit = value.is_some(), "cache get");
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        debug!(key, "cache set");
        self.backend()?.set(key, value, self.ttl)
    }

    pub fn delete(&self, key: &str) -> Result<bool> {
        debug!(key, "cache delete");
        self.backend()?.delete(key)
    }

    fn backend(&self) -> Result<Arc<dyn CacheBackend>> {
        let guard = self.backend.read().map_err(|e| SingletonError::Cache {
            message: format!("Cache client lock poisoned: {}", e),
        })?;
        guard.clone().ok_or(SingletonError::CacheDisconnected)
    }

    fn install(&self, backend: Option<Arc<dyn CacheBackend>>) -> bool {
        match self.backend.write() {
            Ok(mut slot) => {
                let previous = std::mem::replace(&mut *slot, backend);
                previous.is_some()
            }
            Err(poisoned) => {
                let mut slot = poisoned.into_inner();
                let previous = std::mem::replace(&mut *slot, backend);
                previous.is_some()
            }
        }
    }
}

impl std::fmt::Debug for CacheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheClient")
            .field("connected", &self.is_connected())
            .field("ttl", &self.ttl)
            .finish()
    }
}
