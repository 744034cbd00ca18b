//! Singleton types and their persisted record.

use crate::config::SINGLETON_PK;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A configuration type of which at most one row may exist.
///
/// Implementors are plain serde structs; a missing row is created from
/// [`Default`].
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// struct SiteConfiguration {
///     site_name: String,
///     maintenance_mode: bool,
/// }
///
/// impl Singleton for SiteConfiguration {
///     const TYPE_NAME: &'static str = "SiteConfiguration";
///     const APP_LABEL: &'static str = "core";
/// }
/// ```
pub trait Singleton:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
    /// Type name, shown to users as the record's string form.
    const TYPE_NAME: &'static str;

    /// Application the type belongs to; first segment of its admin URLs.
    const APP_LABEL: &'static str;

    /// Lowercased type name, used in cache keys, URLs and route names.
    fn model_name() -> String {
        Self::TYPE_NAME.to_lowercase()
    }

    /// `app_label.model_name`, the key rows are stored under.
    fn label() -> String {
        format!("{}.{}", Self::APP_LABEL, Self::model_name())
    }

    fn verbose_name() -> String {
        camel_case_to_spaces(Self::TYPE_NAME)
    }

    /// A singleton is never plural.
    fn verbose_name_plural() -> String {
        Self::verbose_name()
    }

    /// Whether the admin should create the row the first time it loads.
    fn is_default_available() -> bool {
        true
    }
}

/// A singleton row: the fixed identity plus the type's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub pk: i64,
    #[serde(flatten)]
    pub fields: T,
}

impl<T: Singleton> Record<T> {
    /// Wrap fields under the fixed identity.
    pub fn new(fields: T) -> Self {
        Self {
            pk: SINGLETON_PK,
            fields,
        }
    }

    pub fn into_inner(self) -> T {
        self.fields
    }
}

impl<T: Singleton> Default for Record<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.fields
    }
}

impl<T> DerefMut for Record<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.fields
    }
}

impl<T: Singleton> fmt::Display for Record<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(T::TYPE_NAME)
    }
}

/// Split a CamelCase name into lowercase words: `HTTPSettings` -> `http settings`.
pub fn camel_case_to_spaces(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev_lower = chars[i - 1].is_lowercase();
            let next_lower = chars.get(i + 1).map(|n| !n.is_uppercase()).unwrap_or(false);
            if prev_lower || next_lower {
                out.push(' ');
            }
        }
        out.extend(c.to_lowercase());
    }

    out.trim().to_string()
}
