//! Centralized configuration for allbymyself.
//!
//! Constants for the singleton identity, cache keys and admin templates.

use std::time::Duration;

/// Singleton record configuration.
pub struct SingletonConfig;

impl SingletonConfig {
    /// Primary key shared by every singleton row, across all singleton types.
    pub const SINGLETON_PK: i64 = 1;
    pub const CACHE_KEY_PREFIX: &'static str = "cached_singleton";
}

/// Shorthand for [`SingletonConfig::SINGLETON_PK`].
pub const SINGLETON_PK: i64 = SingletonConfig::SINGLETON_PK;

/// Cache backend defaults.
pub struct CacheSettings;

impl CacheSettings {
    /// Default entry lifetime when a backend does not specify one.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
    pub const MEMORY_MAX_CAPACITY: u64 = 1_000;
    pub const DB_FILENAME: &'static str = "singleton-cache.sqlite";
}

/// Admin templates, submit keys and URL names.
pub struct AdminConfig;

impl AdminConfig {
    pub const CHANGE_FORM_TEMPLATE: &'static str = "admin/singleton_change_form.html";
    pub const OBJECT_HISTORY_TEMPLATE: &'static str = "admin/singleton_object_history.html";
    pub const CHANGE_LIST_TEMPLATE: &'static str = "admin/change_list.html";
    pub const INDEX_URL: &'static str = "/admin/";
    pub const URL_PREFIX: &'static str = "/admin";
    pub const URL_NAMESPACE: &'static str = "admin";

    // Submit buttons on the change form
    pub const SAVE_KEY: &'static str = "_save";
    pub const CONTINUE_KEY: &'static str = "_continue";
    pub const ADD_ANOTHER_KEY: &'static str = "_addanother";
    pub const CSRF_KEY: &'static str = "csrfmiddlewaretoken";
}
