//! Shared fixtures for integration tests.

#![allow(dead_code)]

use allbymyself::store::{LogEntry, NewLogEntry};
use allbymyself::{
    CacheClient, CacheConfig, MemoryCache, Result, Singleton, SingletonError, SingletonRepository,
    SingletonStore, SqliteStore,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingletonTestModel {
    pub site_name: String,
    pub maintenance_mode: bool,
}

impl Default for SingletonTestModel {
    fn default() -> Self {
        Self {
            site_name: "Example".into(),
            maintenance_mode: false,
        }
    }
}

impl Singleton for SingletonTestModel {
    const TYPE_NAME: &'static str = "SingletonTestModel";
    const APP_LABEL: &'static str = "tests";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SingletonTestModelHidden {
    pub note: String,
}

impl Singleton for SingletonTestModelHidden {
    const TYPE_NAME: &'static str = "SingletonTestModelHidden";
    const APP_LABEL: &'static str = "tests";

    fn is_default_available() -> bool {
        false
    }
}

/// Store wrapper counting reads and optionally failing deletes.
pub struct InstrumentedStore {
    inner: SqliteStore,
    pub reads: AtomicUsize,
    pub fail_deletes: AtomicBool,
}

impl InstrumentedStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            reads: AtomicUsize::new(0),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn row_count(&self, model: &str) -> usize {
        self.inner.row_count(model).unwrap()
    }
}

impl SingletonStore for InstrumentedStore {
    fn exists(&self, model: &str, id: i64) -> Result<bool> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(model, id)
    }

    fn get_or_create(&self, model: &str, id: i64, defaults: &str) -> Result<(String, bool)> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_or_create(model, id, defaults)
    }

    fn load(&self, model: &str, id: i64) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(model, id)
    }

    fn save(&self, model: &str, id: i64, data: &str) -> Result<()> {
        self.inner.save(model, id, data)
    }

    fn delete(&self, model: &str, id: i64) -> Result<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(SingletonError::Database {
                message: "delete refused".into(),
                source: None,
            });
        }
        self.inner.delete(model, id)
    }

    fn log_action(&self, entry: &NewLogEntry) -> Result<()> {
        self.inner.log_action(entry)
    }

    fn history(&self, model: &str, object_id: &str) -> Result<Vec<LogEntry>> {
        self.inner.history(model, object_id)
    }
}

pub fn memory_cache() -> CacheClient {
    CacheClient::connected(Arc::new(MemoryCache::new()), &CacheConfig::default())
}

pub fn instrumented<T: Singleton>() -> (Arc<InstrumentedStore>, SingletonRepository<T>) {
    let store = Arc::new(InstrumentedStore::new());
    let repo = SingletonRepository::new(store.clone(), memory_cache());
    (store, repo)
}

pub fn sqlite_repo<T: Singleton>() -> SingletonRepository<T> {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    SingletonRepository::new(store, memory_cache())
}
