//! SQLite singleton store.

use super::traits::{ActionFlag, LogEntry, NewLogEntry, SingletonStore};
use crate::error::{Result, SingletonError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// SQLite-backed [`SingletonStore`].
///
/// The `(model, id)` primary key is the only guard against two concurrent
/// get-or-create calls producing duplicate rows.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a store at the specified database path.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SingletonError::io_with_path(e, parent))?;
            }
        }

        let conn = Connection::open(db_path).map_err(|e| SingletonError::Database {
            message: format!("Failed to open store database: {}", e),
            source: Some(e),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| SingletonError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS singletons (
                model TEXT NOT NULL,
                id INTEGER NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (model, id)
            );

            CREATE TABLE IF NOT EXISTS admin_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                action_time TEXT NOT NULL,
                model TEXT NOT NULL,
                object_id TEXT NOT NULL,
                object_repr TEXT NOT NULL,
                action_flag INTEGER NOT NULL,
                change_message TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_admin_log_object
                ON admin_log(model, object_id);
            "#,
        )
        .map_err(|e| SingletonError::Database {
            message: format!("Failed to initialize store schema: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SingletonError::lock("store database", e))
    }

    /// Number of rows stored for a model.
    pub fn row_count(&self, model: &str) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM singletons WHERE model = ?1",
            params![model],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl SingletonStore for SqliteStore {
    fn exists(&self, model: &str, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM singletons WHERE model = ?1 AND id = ?2 LIMIT 1",
                params![model, id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }

    fn get_or_create(&self, model: &str, id: i64, defaults: &str) -> Result<(String, bool)> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        let inserted = conn
            .execute(
                r#"
                INSERT OR IGNORE INTO singletons (model, id, data, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?4)
                "#,
                params![model, id, defaults, now],
            )
            .map_err(|e| SingletonError::Database {
                message: format!("Failed to create {} row: {}", model, e),
                source: Some(e),
            })?;

        let data: String = conn.query_row(
            "SELECT data FROM singletons WHERE model = ?1 AND id = ?2",
            params![model, id],
            |row| row.get(0),
        )?;

        let created = inserted == 1;
        if created {
            debug!(model, id, "created singleton row");
        }

        Ok((data, created))
    }

    fn load(&self, model: &str, id: i64) -> Result<Option<String>> {
        let conn = self.lock()?;
        let data = conn
            .query_row(
                "SELECT data FROM singletons WHERE model = ?1 AND id = ?2",
                params![model, id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(data)
    }

    fn save(&self, model: &str, id: i64, data: &str) -> Result<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO singletons (model, id, data, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(model, id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
            params![model, id, data, now],
        )
        .map_err(|e| SingletonError::Database {
            message: format!("Failed to save {} row: {}", model, e),
            source: Some(e),
        })?;

        Ok(())
    }

    fn delete(&self, model: &str, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn
            .execute(
                "DELETE FROM singletons WHERE model = ?1 AND id = ?2",
                params![model, id],
            )
            .map_err(|e| SingletonError::Database {
                message: format!("Failed to delete {} row: {}", model, e),
                source: Some(e),
            })?;
        Ok(deleted > 0)
    }

    fn log_action(&self, entry: &NewLogEntry) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO admin_log
            (action_time, model, object_id, object_repr, action_flag, change_message)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                Utc::now().to_rfc3339(),
                entry.model,
                entry.object_id,
                entry.object_repr,
                entry.action_flag.as_i64(),
                entry.change_message,
            ],
        )
        .map_err(|e| SingletonError::Database {
            message: format!("Failed to write admin log: {}", e),
            source: Some(e),
        })?;
        Ok(())
    }

    fn history(&self, model: &str, object_id: &str) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, action_time, model, object_id, object_repr, action_flag, change_message
            FROM admin_log
            WHERE model = ?1 AND object_id = ?2
            ORDER BY id DESC
            "#,
        )?;

        let rows = stmt.query_map(params![model, object_id], |row| {
            let action_time: String = row.get(1)?;
            let flag: i64 = row.get(5)?;
            Ok((
                row.get::<_, i64>(0)?,
                action_time,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                flag,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, action_time, model, object_id, object_repr, flag, change_message) = row?;
            let action_flag = ActionFlag::from_i64(flag).ok_or_else(|| SingletonError::Database {
                message: format!("Unknown admin log action flag {}", flag),
                source: None,
            })?;
            let action_time = DateTime::parse_from_rfc3339(&action_time)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| SingletonError::Database {
                    message: format!("Invalid admin log timestamp: {}", e),
                    source: None,
                })?;
            entries.push(LogEntry {
                id,
                action_time,
                model,
                object_id,
                object_repr,
                action_flag,
                change_message,
            });
        }

        Ok(entries)
    }
}
