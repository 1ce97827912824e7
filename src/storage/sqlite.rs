use rusqlite::params;

use crate::error::StoreResult;
use crate::state::DbPool;
use crate::storage::KeyValueStore;

/// Durable backend over the `kv_entries` table.
pub struct SqliteStorage {
    pool: DbPool,
}

impl SqliteStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.pool.get()?;

        let result: Result<String, rusqlite::Error> = conn.query_row(
            "SELECT value FROM kv_entries WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET
               value = excluded.value,
               updated_at = excluded.updated_at",
            params![key, value],
        )?;

        tracing::debug!("Wrote {} bytes to {}", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(())
    }
}
