//! SQLite-backed client-profile store.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::schema::SCHEMA_SQL;
use cnis_core::{Error, Result};
use cnis_extract::EmploymentHistory;
use cnis_history::ProfileStore;

/// Stores each client's saved employment history in a single SQLite file.
pub struct SqliteProfileStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteProfileStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be `db_dir/cnis.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir)?;
        let db_path = db_dir.join("cnis.db");

        let conn = Connection::open(&db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };
        info!(
            "SqliteProfileStore initialized: {} histories, path={}",
            store.count_histories()?,
            db_dir.display()
        );
        Ok(store)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Database(e.to_string()))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))
    }

    /// Path of the database file, `None` when in memory.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

impl ProfileStore for SqliteProfileStore {
    fn load_history(&self, client_id: &str) -> Result<Option<EmploymentHistory>> {
        let conn = self.conn.lock();
        let json: Option<String> = conn
            .prepare_cached("SELECT history_json FROM client_histories WHERE client_id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![client_id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn update_history(&self, client_id: &str, history: &EmploymentHistory) -> Result<()> {
        let json = serde_json::to_string(history)?;
        let now = chrono::Utc::now().timestamp_millis();

        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO client_histories (client_id, history_json, bond_count, total_months, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(client_id) DO UPDATE SET
                history_json = excluded.history_json,
                bond_count = excluded.bond_count,
                total_months = excluded.total_months,
                updated_at = excluded.updated_at",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            client_id,
            json,
            history.bonds().len() as i64,
            history.total_duration().total_months() as i64,
            now
        ])
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!(
            "Stored history for {} ({} bonds)",
            client_id,
            history.bonds().len()
        );
        Ok(())
    }

    fn delete_history(&self, client_id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "DELETE FROM client_histories WHERE client_id = ?1",
                params![client_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count > 0)
    }

    fn count_histories(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM client_histories", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count.max(0) as usize)
    }
}
