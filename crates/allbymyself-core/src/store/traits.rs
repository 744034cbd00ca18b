//! Store trait and admin log types.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of change recorded in the admin log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionFlag {
    Addition,
    Change,
    Deletion,
}

impl ActionFlag {
    pub fn as_i64(self) -> i64 {
        match self {
            ActionFlag::Addition => 1,
            ActionFlag::Change => 2,
            ActionFlag::Deletion => 3,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(ActionFlag::Addition),
            2 => Some(ActionFlag::Change),
            3 => Some(ActionFlag::Deletion),
            _ => None,
        }
    }
}

/// An admin action about to be recorded.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub model: String,
    pub object_id: String,
    pub object_repr: String,
    pub action_flag: ActionFlag,
    pub change_message: String,
}

/// A recorded admin action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub action_time: DateTime<Utc>,
    pub model: String,
    pub object_id: String,
    pub object_repr: String,
    pub action_flag: ActionFlag,
    pub change_message: String,
}

/// Persistence backend for singleton rows.
///
/// `model` is the `app_label.model_name` label of the singleton type and
/// `data` its JSON-encoded fields. Implementations must make
/// [`get_or_create`](SingletonStore::get_or_create) atomic with respect to the
/// `(model, id)` key.
pub trait SingletonStore: Send + Sync {
    /// Whether a row exists for `(model, id)`.
    fn exists(&self, model: &str, id: i64) -> Result<bool>;

    /// Fetch the row, inserting `defaults` first if it is missing.
    ///
    /// Returns the stored data and whether this call created the row.
    fn get_or_create(&self, model: &str, id: i64, defaults: &str) -> Result<(String, bool)>;

    /// Fetch the row if present.
    fn load(&self, model: &str, id: i64) -> Result<Option<String>>;

    /// Insert or overwrite the row.
    fn save(&self, model: &str, id: i64, data: &str) -> Result<()>;

    /// Delete the row. Returns whether a row was removed.
    fn delete(&self, model: &str, id: i64) -> Result<bool>;

    /// Append an entry to the admin log.
    fn log_action(&self, entry: &NewLogEntry) -> Result<()>;

    /// Admin log entries for an object, newest first.
    fn history(&self, model: &str, object_id: &str) -> Result<Vec<LogEntry>>;
}
