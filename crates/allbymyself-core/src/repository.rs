//! Read-through access to a singleton type.

use crate::cache::CacheClient;
use crate::config::{SingletonConfig, SINGLETON_PK};
use crate::error::Result;
use crate::record::{Record, Singleton};
use crate::store::SingletonStore;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Data-access object for one singleton type.
///
/// Owns the existence check, fetch-or-create, cache population and
/// invalidation for `T`. Store and cache errors are returned unchanged.
pub struct SingletonRepository<T: Singleton> {
    store: Arc<dyn SingletonStore>,
    cache: CacheClient,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Singleton> Clone for SingletonRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: self.cache.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Singleton> SingletonRepository<T> {
    pub fn new(store: Arc<dyn SingletonStore>, cache: CacheClient) -> Self {
        Self {
            store,
            cache,
            _marker: PhantomData,
        }
    }

    /// `cached_singleton:<lowercased type name>`.
    pub fn cache_key() -> String {
        format!("{}:{}", SingletonConfig::CACHE_KEY_PREFIX, T::model_name())
    }

    pub fn is_default_available(&self) -> bool {
        T::is_default_available()
    }

    pub fn cache(&self) -> &CacheClient {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn SingletonStore> {
        &self.store
    }

    /// Whether the row with the fixed identity is present in the store.
    pub fn exists(&self) -> Result<bool> {
        self.store.exists(&T::label(), SINGLETON_PK)
    }

    /// Fetch the singleton, creating it if missing.
    ///
    /// A cache hit is returned as-is without consulting the store. On a miss
    /// the row is fetched or created; only a row that already existed is
    /// written back to the cache. A freshly created row stays uncached until
    /// its first save or the next `get`.
    pub fn get(&self) -> Result<Record<T>> {
        let key = Self::cache_key();

        if let Some(bytes) = self.cache.get(&key)? {
            match serde_json::from_slice::<Record<T>>(&bytes) {
                Ok(record) => return Ok(record),
                Err(e) => {
                    warn!(key = %key, "Discarding undecodable cache entry: {}", e);
                    self.cache.delete(&key)?;
                }
            }
        }

        let defaults = serde_json::to_string(&T::default())?;
        let (data, created) = self
            .store
            .get_or_create(&T::label(), SINGLETON_PK, &defaults)?;
        let record = Record {
            pk: SINGLETON_PK,
            fields: serde_json::from_str(&data)?,
        };

        if created {
            debug!(model = %T::label(), "Created singleton on first access");
        } else {
            self.cache_record(&record)?;
        }

        Ok(record)
    }

    /// Read the row straight from the store, bypassing the cache.
    pub fn load(&self) -> Result<Option<Record<T>>> {
        match self.store.load(&T::label(), SINGLETON_PK)? {
            Some(data) => Ok(Some(Record {
                pk: SINGLETON_PK,
                fields: serde_json::from_str(&data)?,
            })),
            None => Ok(None),
        }
    }

    /// Persist the record under the fixed identity and refresh the cache.
    ///
    /// Any other `pk` on the record is overwritten before writing.
    pub fn save(&self, record: &mut Record<T>) -> Result<()> {
        if record.pk != SINGLETON_PK {
            debug!(model = %T::label(), pk = record.pk, "Coercing singleton pk");
        }
        record.pk = SINGLETON_PK;

        let data = serde_json::to_string(&record.fields)?;
        self.store.save(&T::label(), SINGLETON_PK, &data)?;
        self.cache_record(record)
    }

    /// Evict the cached copy, then delete the row.
    ///
    /// The cache is cleared before the store is touched, so a failing store
    /// delete still leaves no cached copy behind.
    pub fn delete(&self, _record: &Record<T>) -> Result<()> {
        self.uncache()?;
        let deleted = self.store.delete(&T::label(), SINGLETON_PK)?;
        debug!(model = %T::label(), deleted, "Deleted singleton");
        Ok(())
    }

    fn cache_record(&self, record: &Record<T>) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        self.cache.set(&Self::cache_key(), &bytes)
    }

    fn uncache(&self) -> Result<bool> {
        self.cache.delete(&Self::cache_key())
    }
}
