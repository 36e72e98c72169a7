//! Data store gateway.
//!
//! Every call opens its own SQLite connection, runs one statement and drops
//! the connection before returning, on success and on failure alike.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use serde_json::Value;
use tracing::instrument;

use crate::config::DatabaseConfig;
use crate::store::error::{StoreError, StoreResult};

/// Bound statement parameter.
pub type SqlValue = rusqlite::types::Value;

/// A result row: column name → value, in select-list order.
pub type Row = serde_json::Map<String, Value>;

/// Outcome of a row-affecting statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    pub rows_affected: usize,
    /// Rowid generated by the statement (last insert on this connection).
    pub last_insert_id: i64,
}

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the relational store. Cheap to clone; holds no connection.
#[derive(Debug, Clone)]
pub struct Store {
    path: Arc<PathBuf>,
    busy_timeout: Duration,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(&config.path).with_busy_timeout(Duration::from_millis(config.busy_timeout_ms))
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify the database can be opened. Used once at startup.
    pub fn check(&self) -> StoreResult<()> {
        self.connect().map(drop)
    }

    /// Open a connection to an existing database file.
    ///
    /// The file is never created here; schema setup belongs to `setup`.
    fn connect(&self) -> StoreResult<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(self.path.as_path(), flags).map_err(|source| {
            StoreError::Open {
                path: self.path.to_path_buf(),
                source,
            }
        })?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Run a row-returning statement.
    #[instrument(skip(self, params), fields(sql = %sql))]
    pub async fn query(&self, sql: &str, params: Vec<SqlValue>) -> StoreResult<Vec<Row>> {
        let store = self.clone();
        let sql = sql.to_owned();
        tokio::task::spawn_blocking(move || store.query_blocking(&sql, &params)).await?
    }

    /// Run a row-affecting statement.
    #[instrument(skip(self, params), fields(sql = %sql))]
    pub async fn execute(&self, sql: &str, params: Vec<SqlValue>) -> StoreResult<Execution> {
        let store = self.clone();
        let sql = sql.to_owned();
        tokio::task::spawn_blocking(move || store.execute_blocking(&sql, &params)).await?
    }

    fn query_blocking(&self, sql: &str, params: &[SqlValue]) -> StoreResult<Vec<Row>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                record.insert(name.clone(), to_json(row.get_ref(idx)?));
            }
            out.push(record);
        }
        Ok(out)
    }

    fn execute_blocking(&self, sql: &str, params: &[SqlValue]) -> StoreResult<Execution> {
        let conn = self.connect()?;
        let rows_affected = conn.execute(sql, params_from_iter(params.iter()))?;
        Ok(Execution {
            rows_affected,
            last_insert_id: conn.last_insert_rowid(),
        })
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|&b| Value::from(b)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::setup;

    fn seeded() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");
        setup::initialize(&path).unwrap();
        (dir, Store::new(path))
    }

    #[tokio::test]
    async fn test_query_preserves_column_order() {
        let (_dir, store) = seeded();

        let rows = store.query("SELECT * FROM products", vec![]).await.unwrap();
        assert_eq!(rows.len(), 5);

        let columns: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(columns, ["id", "name", "price", "description"]);
        assert_eq!(rows[0]["name"], "Laptop");
        assert_eq!(rows[0]["price"], 999.99);
    }

    #[tokio::test]
    async fn test_query_with_params() {
        let (_dir, store) = seeded();

        let rows = store
            .query(
                "SELECT price FROM products WHERE id = ?",
                vec![SqlValue::Integer(2)],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["price"], 29.99);

        let none = store
            .query(
                "SELECT price FROM products WHERE id = ?",
                vec![SqlValue::Integer(999)],
            )
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_execute_returns_generated_id() {
        let (_dir, store) = seeded();

        let outcome = store
            .execute(
                "INSERT INTO orders (product_id, quantity, total) VALUES (?, ?, ?)",
                vec![SqlValue::Integer(3), SqlValue::Integer(2), SqlValue::Real(159.98)],
            )
            .await
            .unwrap();

        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(outcome.last_insert_id, 6);
    }

    #[tokio::test]
    async fn test_foreign_key_is_enforced() {
        let (_dir, store) = seeded();

        let err = store
            .execute(
                "INSERT INTO orders (product_id, quantity, total) VALUES (?, ?, ?)",
                vec![SqlValue::Integer(999), SqlValue::Integer(1), SqlValue::Real(1.0)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));

        let orders = store.query("SELECT * FROM orders", vec![]).await.unwrap();
        assert_eq!(orders.len(), 5);
    }

    #[tokio::test]
    async fn test_missing_table_is_store_error() {
        let (_dir, store) = seeded();
        let err = store.query("SELECT * FROM customers", vec![]).await.unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let store = Store::new(&path);

        let err = store.query("SELECT 1", vec![]).await.unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));
        assert!(store.check().is_err());
        assert!(!path.exists());
    }
}
