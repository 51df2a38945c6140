use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::cache::error::CacheError;

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: index for expiry purges
    &["CREATE INDEX IF NOT EXISTS idx_cache_entries_expires_at ON cache_entries(expires_at)"],
];

/// SQLite-backed cache store
///
/// Entries survive restarts and can be shared by several processes using the
/// same database file.
pub struct SqliteCacheStore {
    conn: Mutex<Connection>,
}

impl SqliteCacheStore {
    pub fn new(db_path: &Path) -> Result<Self, CacheError> {
        info!("Initializing cache database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::with_connection(conn)
    }

    /// Opens a store backed by a private in-memory database
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        info!("Cache initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    fn current_timestamp_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                PRIMARY KEY(namespace, key)
            )
            "#,
            [],
        )?;

        Self::apply_migrations(&conn)?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), CacheError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    conn.execute(sql, [])?;
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
            debug!("Updated schema version to v{}", target_version);
        }

        Ok(())
    }
}

impl CacheStore for SqliteCacheStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, CacheError> {
        let now = Self::current_timestamp_ms();
        let conn = self.lock_conn()?;

        let value = conn
            .query_row(
                r#"
                SELECT value FROM cache_entries
                WHERE namespace = ?1 AND key = ?2 AND expires_at > ?3
                "#,
                (namespace, key, now),
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = Self::current_timestamp_ms().saturating_add(ttl_ms);

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO cache_entries (namespace, key, value, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at
            "#,
            (namespace, key, value, expires_at),
        )?;

        debug!("Stored cache entry {}/{}", namespace, key);
        Ok(())
    }

    fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Self::current_timestamp_ms();
        let conn = self.lock_conn()?;

        let purged = conn.execute("DELETE FROM cache_entries WHERE expires_at <= ?1", [now])?;

        info!("Purged {} expired cache entries", purged);
        Ok(purged)
    }

    fn clear(&self) -> Result<(), CacheError> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM cache_entries", [])?;
        Ok(())
    }
}
