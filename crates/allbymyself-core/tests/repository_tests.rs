//! Integration tests for singleton persistence and caching.

mod common;

use allbymyself::{
    CacheClient, CacheConfig, Record, Singleton, SingletonError, SingletonRepository, SqliteCache,
    SqliteStore, SINGLETON_PK,
};
use common::{instrumented, memory_cache, sqlite_repo, SingletonTestModel};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;

type Repo = SingletonRepository<SingletonTestModel>;

fn cached(repo: &Repo) -> Option<Record<SingletonTestModel>> {
    repo.cache()
        .get(&Repo::cache_key())
        .unwrap()
        .map(|bytes| serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn test_get_on_empty_store_creates_exactly_one_row() {
    let (store, repo) = instrumented::<SingletonTestModel>();
    assert!(!repo.exists().unwrap());

    let record = repo.get().unwrap();

    assert!(repo.exists().unwrap());
    assert_eq!(record.pk, SINGLETON_PK);
    assert_eq!(record.fields, SingletonTestModel::default());
    assert_eq!(store.row_count(&SingletonTestModel::label()), 1);
}

#[test]
fn test_get_on_created_row_does_not_cache_it() {
    // Only rows that already existed are cached by get(); a fresh row is not.
    let repo = sqlite_repo::<SingletonTestModel>();

    repo.get().unwrap();
    assert!(cached(&repo).is_none());

    // The second call finds the row in the store and caches it.
    repo.get().unwrap();
    assert!(cached(&repo).is_some());
}

#[test]
fn test_second_get_is_served_from_cache() {
    let (store, repo) = instrumented::<SingletonTestModel>();
    repo.get().unwrap();

    let first = repo.get().unwrap();
    let reads_after_first = store.reads();

    let second = repo.get().unwrap();
    assert_eq!(first, second);
    assert_eq!(store.reads(), reads_after_first);
}

#[test]
fn test_cache_hit_is_not_checked_against_store() {
    let (store, repo) = instrumented::<SingletonTestModel>();
    repo.get().unwrap();
    repo.get().unwrap();

    // Write behind the repository's back; the cached copy still wins.
    use allbymyself::SingletonStore;
    store
        .save(
            &SingletonTestModel::label(),
            SINGLETON_PK,
            r#"{"site_name":"Elsewhere","maintenance_mode":true}"#,
        )
        .unwrap();

    assert_eq!(repo.get().unwrap().site_name, "Example");
}

#[test]
fn test_save_coerces_identity() {
    let repo = sqlite_repo::<SingletonTestModel>();

    let mut record = Record::new(SingletonTestModel {
        site_name: "Renamed".into(),
        maintenance_mode: true,
    });
    record.pk = 42;
    repo.save(&mut record).unwrap();

    assert_eq!(record.pk, SINGLETON_PK);
    assert!(repo.exists().unwrap());
    let stored = repo.load().unwrap().unwrap();
    assert_eq!(stored.pk, SINGLETON_PK);
    assert_eq!(stored.site_name, "Renamed");
}

#[test]
fn test_save_refreshes_cache() {
    let repo = sqlite_repo::<SingletonTestModel>();
    let mut record = repo.get().unwrap();
    record.maintenance_mode = true;
    repo.save(&mut record).unwrap();

    assert_eq!(cached(&repo), Some(record.clone()));
    assert!(repo.get().unwrap().maintenance_mode);
}

#[test]
fn test_delete_clears_cache_and_row() {
    let repo = sqlite_repo::<SingletonTestModel>();
    let mut record = repo.get().unwrap();
    repo.save(&mut record).unwrap();
    assert!(cached(&repo).is_some());

    repo.delete(&record).unwrap();

    assert!(cached(&repo).is_none());
    assert!(!repo.exists().unwrap());
}

#[test]
fn test_delete_evicts_cache_even_when_store_fails() {
    let (store, repo) = instrumented::<SingletonTestModel>();
    let mut record = repo.get().unwrap();
    repo.save(&mut record).unwrap();

    store.fail_deletes.store(true, Ordering::SeqCst);
    let result = repo.delete(&record);

    assert!(matches!(result, Err(SingletonError::Database { .. })));
    assert!(cached(&repo).is_none());
    assert!(repo.exists().unwrap());
}

#[test]
fn test_get_after_delete_recreates_defaults() {
    let repo = sqlite_repo::<SingletonTestModel>();
    let mut record = repo.get().unwrap();
    record.site_name = "Changed".into();
    repo.save(&mut record).unwrap();
    repo.delete(&record).unwrap();

    let fresh = repo.get().unwrap();
    assert_eq!(fresh.fields, SingletonTestModel::default());
}

#[test]
fn test_disconnected_cache_propagates_error() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let cache = CacheClient::new(&CacheConfig::default());
    let repo = Repo::new(store, cache.clone());

    assert!(matches!(repo.get(), Err(SingletonError::CacheDisconnected)));
    // exists() never touches the cache
    assert!(!repo.exists().unwrap());

    cache.connect(Arc::new(allbymyself::MemoryCache::new()));
    assert!(repo.get().is_ok());
}

#[test]
fn test_repositories_share_cache_through_sqlite_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(temp_dir.path().join("store.sqlite")).unwrap());
    let cache_path = temp_dir.path().join("cache.sqlite");

    let config = CacheConfig::default();
    let first = Repo::new(
        store.clone(),
        CacheClient::connected(Arc::new(SqliteCache::new(&cache_path).unwrap()), &config),
    );
    let second = Repo::new(
        store,
        CacheClient::connected(Arc::new(SqliteCache::new(&cache_path).unwrap()), &config),
    );

    let mut record = first.get().unwrap();
    record.site_name = "Shared".into();
    first.save(&mut record).unwrap();

    assert_eq!(cached(&second).unwrap().site_name, "Shared");
}

#[test]
fn test_cache_keys_are_per_type() {
    assert_eq!(Repo::cache_key(), "cached_singleton:singletontestmodel");
    assert_eq!(
        SingletonRepository::<common::SingletonTestModelHidden>::cache_key(),
        "cached_singleton:singletontestmodelhidden"
    );

    let cache = memory_cache();
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let visible = Repo::new(store.clone(), cache.clone());
    let hidden = SingletonRepository::<common::SingletonTestModelHidden>::new(store, cache);

    let mut record = visible.get().unwrap();
    visible.save(&mut record).unwrap();
    assert!(!hidden.exists().unwrap());
}
