// SQLite persistence for teams and pitchers.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

/// A stored row: the entity id and its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: u64,
    pub body: String,
}

/// SQLite-backed key-value storage, one namespace per collection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                id         INTEGER NOT NULL,
                body       TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (collection, id)
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock).
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Replace the contents of `collection` with `rows` in one transaction.
    /// Existing ids are updated, new ids inserted and ids missing from `rows`
    /// deleted.
    pub fn replace_collection(&self, collection: &str, rows: &[Row]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;

        {
            let mut upsert = tx
                .prepare(
                    "INSERT INTO records (collection, id, body) VALUES (?1, ?2, ?3)
                     ON CONFLICT(collection, id) DO UPDATE SET
                        body       = excluded.body,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                )
                .context("failed to prepare upsert")?;
            for row in rows {
                let id = to_sql_id(row.id)?;
                upsert
                    .execute(params![collection, id, row.body])
                    .with_context(|| format!("failed to upsert {collection}/{}", row.id))?;
            }
        }

        let keep: Vec<i64> = rows.iter().map(|r| to_sql_id(r.id)).collect::<Result<_>>()?;
        let keep_json = serde_json::to_string(&keep).context("failed to encode id list")?;
        tx.execute(
            "DELETE FROM records
             WHERE collection = ?1
               AND id NOT IN (SELECT value FROM json_each(?2))",
            params![collection, keep_json],
        )
        .context("failed to prune removed records")?;

        tx.commit().context("failed to commit transaction")?;
        Ok(())
    }

    /// Every row in `collection`, ordered by id.
    pub fn load_collection(&self, collection: &str) -> Result<Vec<Row>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, body FROM records WHERE collection = ?1 ORDER BY id")
            .context("failed to prepare load_collection query")?;

        let rows = stmt
            .query_map(params![collection], |row| {
                let id: i64 = row.get(0)?;
                let body: String = row.get(1)?;
                Ok((id, body))
            })
            .context("failed to query records")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map record rows")?;

        rows.into_iter()
            .map(|(id, body)| {
                let id = u64::try_from(id).with_context(|| format!("negative record id {id}"))?;
                Ok(Row { id, body })
            })
            .collect()
    }

    /// Number of rows stored for `collection`.
    pub fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM records WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            )
            .context("failed to count records")?;
        Ok(count as usize)
    }
}

fn to_sql_id(id: u64) -> Result<i64> {
    i64::try_from(id).with_context(|| format!("record id {id} out of range"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
