//! allbymyself - configuration records that have exactly one row.
//!
//! A [`Singleton`] type is persisted under the fixed identity
//! [`SINGLETON_PK`] through a [`SingletonRepository`], which keeps a
//! read-through copy in an injected [`CacheClient`]. [`SingletonAdmin`]
//! adapts a generic model admin so the record is always edited in place.
//!
//! # Example
//!
//! ```rust,ignore
//! use allbymyself::{CacheClient, CacheConfig, MemoryCache, SingletonRepository, SqliteStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::open("data/singletons.sqlite")?);
//! let cache = CacheClient::connected(Arc::new(MemoryCache::new()), &CacheConfig::default());
//! let repo = SingletonRepository::<SiteConfiguration>::new(store, cache);
//!
//! let mut config = repo.get()?;
//! config.maintenance_mode = true;
//! repo.save(&mut config)?;
//! ```

pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod path_utils;
pub mod record;
pub mod repository;
pub mod store;

pub use admin::{AdminRequest, AdminResponse, AdminSite, ModelAdmin, SingletonAdmin};
pub use cache::{CacheBackend, CacheClient, CacheConfig, MemoryCache, SqliteCache};
pub use config::SINGLETON_PK;
pub use error::{Result, SingletonError};
pub use path_utils::get_path_name;
pub use record::{Record, Singleton};
pub use repository::SingletonRepository;
pub use store::{SingletonStore, SqliteStore};
