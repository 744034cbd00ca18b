//! SQLite-based cache implementation.

use super::traits::CacheBackend;
use crate::error::{Result, SingletonError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// SQLite-based cache backend.
///
/// Lets several admin processes share one cache file. Thread-safe via an
/// internal mutex on the connection.
pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCache {
    /// Create a new cache at the specified database path.
    ///
    /// Creates the database and tables if they don't exist.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SingletonError::Io {
                message: format!("Failed to create cache directory: {}", e),
                path: Some(parent.to_path_buf()),
                source: Some(e),
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| SingletonError::Database {
            message: format!("Failed to open cache database: {}", e),
            source: Some(e),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| SingletonError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        Self::from_connection(conn)
    }

    /// Create a cache that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let cache = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                cached_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_cache_expires
                ON cache_entries(expires_at);
            "#,
        )
        .map_err(|e| SingletonError::Database {
            message: format!("Failed to initialize cache schema: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SingletonError::lock("cache database", e))
    }

    /// Remove expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> Result<usize> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        let deleted = conn
            .execute(
                "DELETE FROM cache_entries WHERE expires_at <= ?1",
                params![now],
            )
            .map_err(|e| SingletonError::Database {
                message: format!("Failed to cleanup expired entries: {}", e),
                source: Some(e),
            })?;

        if deleted > 0 {
            debug!("Cleaned up {} expired cache entries", deleted);
        }

        Ok(deleted)
    }

    /// Number of stored entries, expired ones included.
    pub fn entry_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }
}

impl CacheBackend for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.query_row(
            "SELECT value FROM cache_entries WHERE key = ?1 AND expires_at > ?2",
            params![key, now],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| SingletonError::Database {
            message: format!("Failed to query cache entry: {}", e),
            source: Some(e),
        })
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let conn = self.lock()?;

        let now = Utc::now();
        let expires_at = now + chrono::Duration::from_std(ttl).unwrap_or_default();

        conn.execute(
            r#"
            INSERT OR REPLACE INTO cache_entries (key, value, cached_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![key, value, now.to_rfc3339(), expires_at.to_rfc3339()],
        )
        .map_err(|e| SingletonError::Database {
            message: format!("Failed to set cache entry: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        let live: bool = conn
            .query_row(
                "SELECT 1 FROM cache_entries WHERE key = ?1 AND expires_at > ?2",
                params![key, now],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])
            .map_err(|e| SingletonError::Database {
                message: format!("Failed to delete cache entry: {}", e),
                source: Some(e),
            })?;

        Ok(live)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM cache_entries", [])
            .map_err(|e| SingletonError::Database {
                message: format!("Failed to clear cache entries: {}", e),
                source: Some(e),
            })?;

        debug!("Cleared all cache data");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_cache() -> (TempDir, SqliteCache) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("cache").join("test_cache.sqlite");
        let cache = SqliteCache::new(&db_path).unwrap();
        (temp_dir, cache)
    }

    #[test]
    fn test_set_and_get() {
        let (_temp, cache) = create_test_cache();

        cache
            .set("cached_singleton:a", b"hello world", Duration::from_secs(3600))
            .unwrap();

        let value = cache.get("cached_singleton:a").unwrap();
        assert_eq!(value, Some(b"hello world".to_vec()));
    }

    #[test]
    fn test_expiration() {
        let (_temp, cache) = create_test_cache();

        cache.set("expired_key", b"old data", Duration::ZERO).unwrap();

        assert!(cache.get("expired_key").unwrap().is_none());
    }

    #[test]
    fn test_overwrite() {
        let (_temp, cache) = create_test_cache();

        cache.set("k", b"one", Duration::from_secs(60)).unwrap();
        cache.set("k", b"two", Duration::from_secs(60)).unwrap();

        assert_eq!(cache.get("k").unwrap(), Some(b"two".to_vec()));
        assert_eq!(cache.entry_count().unwrap(), 1);
    }

    #[test]
    fn test_delete() {
        let (_temp, cache) = create_test_cache();

        cache.set("key1", b"data1", Duration::from_secs(3600)).unwrap();
        cache.set("key2", b"data2", Duration::from_secs(3600)).unwrap();

        assert!(cache.delete("key1").unwrap());
        assert!(!cache.delete("key1").unwrap());

        assert!(cache.get("key1").unwrap().is_none());
        assert!(cache.get("key2").unwrap().is_some());
    }

    #[test]
    fn test_cleanup_expired() {
        let (_temp, cache) = create_test_cache();

        cache.set("old1", b"data", Duration::ZERO).unwrap();
        cache.set("old2", b"data", Duration::ZERO).unwrap();
        cache.set("new1", b"data", Duration::from_secs(3600)).unwrap();

        let cleaned = cache.cleanup_expired().unwrap();
        assert_eq!(cleaned, 2);
        assert_eq!(cache.entry_count().unwrap(), 1);
    }

    #[test]
    fn test_shared_file_between_handles() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("shared.sqlite");

        let writer = SqliteCache::new(&db_path).unwrap();
        let reader = SqliteCache::new(&db_path).unwrap();

        writer.set("k", b"v", Duration::from_secs(60)).unwrap();
        assert_eq!(reader.get("k").unwrap(), Some(b"v".to_vec()));
    }
}
