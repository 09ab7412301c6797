//! DuckDB-backed store.
//!
//! [`Database`] owns the connection and the interceptor chain. Every statement
//! goes through [`Database::prepare_sql`] before DuckDB sees it, which is where
//! logical table names turn into physical ones.
//!
//! # Example
//!
//! ```ignore
//! use dynamic_tablename::interceptor::{DynamicTableNameInterceptor, InterceptorChain};
//! use dynamic_tablename::store::{Database, DatabaseConfig};
//!
//! let chain = InterceptorChain::new().with(DynamicTableNameInterceptor::for_tenant(tenant));
//! let db = Database::open(&DatabaseConfig::default(), chain)?;
//! db.execute("DELETE FROM score WHERE id = ?", [1])?; // runs against lincoln_score
//! ```

mod output;
mod values;

pub use output::{OutputFormat, QueryResultFormatter};
pub use values::render_value;

use crate::interceptor::InterceptorChain;
use anyhow::{Context, Result};
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection, Params, Row};
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::{debug, info};

/// Connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// DuckDB database file; in-memory when `None`
    pub path: Option<PathBuf>,
    /// Memory limit for DuckDB (e.g., "4GB")
    pub memory_limit: Option<String>,
}

/// Result of a query, rendered to strings for display
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Column types (as strings)
    pub column_types: Vec<String>,
    /// Rows of data (each row is a vector of string values)
    pub rows: Vec<Vec<String>>,
    /// Query execution time in seconds
    pub execution_time_secs: f64,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// A DuckDB connection whose statements pass through an interceptor chain
pub struct Database {
    conn: Connection,
    interceptors: InterceptorChain,
    config: DatabaseConfig,
}

impl Database {
    /// Open the database described by `config`
    pub fn open(config: &DatabaseConfig, interceptors: InterceptorChain) -> Result<Self> {
        let conn = match config.path {
            Some(ref path) => Connection::open(path)
                .with_context(|| format!("Failed to open DuckDB database: {}", path.display()))?,
            None => Connection::open_in_memory()
                .context("Failed to create in-memory DuckDB database")?,
        };

        if let Some(ref limit) = config.memory_limit {
            conn.execute(&format!("SET memory_limit = '{}'", limit), [])
                .context("Failed to set memory limit")?;
        }

        info!(
            path = %config.path.as_deref().map(|p| p.display().to_string()).unwrap_or_else(|| ":memory:".to_string()),
            interceptors = ?interceptors.names(),
            "opened database"
        );

        Ok(Self {
            conn,
            interceptors,
            config: config.clone(),
        })
    }

    pub fn open_in_memory(interceptors: InterceptorChain) -> Result<Self> {
        Self::open(&DatabaseConfig::default(), interceptors)
    }

    /// Statement-preparation hook: the SQL that will actually be executed
    pub fn prepare_sql<'s>(&self, sql: &'s str) -> Cow<'s, str> {
        let prepared = self.interceptors.apply(sql);
        if let Cow::Owned(ref rewritten) = prepared {
            debug!(original = sql, rewritten = %rewritten, "statement rewritten");
        }
        prepared
    }

    /// Execute a statement that doesn't return rows
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        let sql = self.prepare_sql(sql);
        self.conn
            .execute(&sql, params)
            .with_context(|| format!("Failed to execute: {}", sql))
    }

    /// Execute one or more `;`-separated statements without parameters
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let sql = self.prepare_sql(sql);
        self.conn
            .execute_batch(&sql)
            .with_context(|| format!("Failed to execute: {}", sql))
    }

    /// Execute one statement once per parameter row, inside a transaction
    pub fn execute_many<I>(&self, sql: &str, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let sql = self.prepare_sql(sql);
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .context("Failed to begin transaction")?;

        let result = (|| -> Result<usize> {
            let mut stmt = self
                .conn
                .prepare(&sql)
                .with_context(|| format!("Failed to prepare: {}", sql))?;
            let mut affected = 0;
            for row in rows {
                affected += stmt
                    .execute(params_from_iter(row))
                    .with_context(|| format!("Failed to execute: {}", sql))?;
            }
            Ok(affected)
        })();

        self.finish_transaction(result)
    }

    /// Commit on success. Any failure, including a failed COMMIT, rolls back
    /// so the connection is never left inside an open transaction.
    fn finish_transaction<T>(&self, result: Result<T>) -> Result<T> {
        let result = result.and_then(|value| {
            self.conn
                .execute_batch("COMMIT")
                .context("Failed to commit transaction")?;
            Ok(value)
        });
        if result.is_err() {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
        result
    }

    /// Run a query and map every row with `f`
    pub fn query_map<T, P, F>(&self, sql: &str, params: P, mut f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> duckdb::Result<T>,
    {
        let sql = self.prepare_sql(sql);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("Failed to prepare query: {}", sql))?;
        let mut rows = stmt
            .query(params)
            .with_context(|| format!("Failed to execute query: {}", sql))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(f(row)?);
        }
        Ok(out)
    }

    /// Run a query and map the first row, if any
    pub fn query_row<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> duckdb::Result<T>,
    {
        Ok(self.query_map(sql, params, f)?.into_iter().next())
    }

    /// Execute a query and return the rendered result
    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        let sql = self.prepare_sql(sql);
        self.query_prepared(&sql)
    }

    /// Run a query as-is, bypassing the interceptors
    fn query_prepared(&self, sql: &str) -> Result<QueryResult> {
        let start = std::time::Instant::now();

        let mut stmt = self
            .conn
            .prepare(sql)
            .with_context(|| format!("Failed to prepare query: {}", sql))?;

        let mut rows_result = stmt
            .query([])
            .with_context(|| format!("Failed to execute query: {}", sql))?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        while let Some(row) = rows_result.next()? {
            let column_count = row.as_ref().column_count();
            let values = (0..column_count)
                .map(|i| match row.get_ref(i) {
                    Ok(value) => render_value(value),
                    Err(_) => "ERROR".to_string(),
                })
                .collect();
            rows.push(values);
        }

        // Release the borrow on the statement before reading column metadata
        drop(rows_result);

        let column_count = stmt.column_count();
        let columns: Vec<String> = (0..column_count)
            .map(|i| {
                stmt.column_name(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| format!("col{}", i))
            })
            .collect();
        let column_types: Vec<String> = (0..column_count)
            .map(|i| format!("{:?}", stmt.column_type(i)))
            .collect();

        Ok(QueryResult {
            columns,
            column_types,
            rows,
            execution_time_secs: start.elapsed().as_secs_f64(),
        })
    }

    /// Physical tables in the main schema. Catalog queries skip the interceptors.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let result = self.query_prepared(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' ORDER BY table_name",
        )?;
        Ok(result.rows.into_iter().filter_map(|mut r| r.pop()).collect())
    }

    /// Whether a physical table exists
    pub fn table_exists(&self, physical_name: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = 'main' AND table_name = ?",
                duckdb::params![physical_name],
                |row| row.get(0),
            )
            .context("Failed to look up table")?;
        Ok(count > 0)
    }

    /// Columns of a logical table, resolved through the interceptors
    pub fn describe_table(&self, table: &str) -> Result<QueryResult> {
        self.query(&format!("DESCRIBE SELECT * FROM {}", quote_ident(table)))
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Get the underlying DuckDB connection (for advanced use)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Double-quote an identifier, escaping embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::DynamicTableNameInterceptor;
    use crate::tenant::TenantConfig;
    use std::sync::Arc;

    fn lincoln_db() -> Database {
        let tenant = Arc::new(TenantConfig::new(Some("lincoln".to_string()), ["score"]));
        let chain = InterceptorChain::new().with(DynamicTableNameInterceptor::for_tenant(tenant));
        Database::open_in_memory(chain).unwrap()
    }

    #[test]
    fn test_create_goes_to_prefixed_table() {
        let db = lincoln_db();
        db.execute_batch("CREATE TABLE score (id BIGINT, score INTEGER)")
            .unwrap();
        assert!(db.table_exists("lincoln_score").unwrap());
        assert!(!db.table_exists("score").unwrap());
        assert_eq!(db.list_tables().unwrap(), vec!["lincoln_score"]);
    }

    #[test]
    fn test_query_reads_prefixed_table() {
        let db = lincoln_db();
        db.execute_batch("CREATE TABLE score (id BIGINT, score INTEGER)")
            .unwrap();
        db.execute("INSERT INTO score VALUES (?, ?)", duckdb::params![1, 95])
            .unwrap();

        let result = db.query("SELECT id, score FROM score").unwrap();
        assert_eq!(result.columns, vec!["id", "score"]);
        assert_eq!(result.rows, vec![vec!["1".to_string(), "95".to_string()]]);
    }

    #[test]
    fn test_execute_many_commits() {
        let db = lincoln_db();
        db.execute_batch("CREATE TABLE score (id BIGINT)").unwrap();
        let rows = (1..=3).map(|i| vec![Value::BigInt(i)]);
        assert_eq!(db.execute_many("INSERT INTO score VALUES (?)", rows).unwrap(), 3);

        let count = db
            .query_row("SELECT COUNT(*) FROM score", [], |r| r.get::<_, i64>(0))
            .unwrap();
        assert_eq!(count, Some(3));
    }

    #[test]
    fn test_failed_commit_leaves_no_open_transaction() {
        let db = lincoln_db();
        db.connection().execute_batch("BEGIN TRANSACTION").unwrap();
        assert!(db.connection().execute_batch("SELECT * FROM missing").is_err());

        let _ = db.finish_transaction(Ok(0));
        db.connection().execute_batch("BEGIN TRANSACTION").unwrap();
        db.connection().execute_batch("ROLLBACK").unwrap();
    }

    #[test]
    fn test_commit_without_transaction_is_error() {
        let db = lincoln_db();
        let err = db.finish_transaction(Ok(1)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to commit transaction"));
        assert!(db.query("SELECT 1 AS one").is_ok());
    }

    #[test]
    fn test_error_mentions_rewritten_sql() {
        let db = lincoln_db();
        let err = db.query("SELECT * FROM score").unwrap_err();
        assert!(format!("{:#}", err).contains("lincoln_score"));
    }

    #[test]
    fn test_describe_table_uses_logical_name() {
        let db = lincoln_db();
        db.execute_batch("CREATE TABLE score (id BIGINT, score INTEGER)")
            .unwrap();
        let result = db.describe_table("score").unwrap();
        assert_eq!(result.row_count(), 2);
    }

    #[test]
    fn test_backslash_literal_still_reads_tenant_table() {
        let db = lincoln_db();
        db.connection()
            .execute_batch(
                "CREATE TABLE score (id BIGINT); INSERT INTO score VALUES (1), (2), (3); \
                 CREATE TABLE lincoln_score (id BIGINT);",
            )
            .unwrap();

        let sql = r"SELECT '\' AS a, COUNT(*) AS n FROM score";
        assert_eq!(db.prepare_sql(sql), r"SELECT '\' AS a, COUNT(*) AS n FROM lincoln_score");
        let result = db.query(sql).unwrap();
        assert_eq!(result.rows, vec![vec!["\\".to_string(), "0".to_string()]]);
    }

    #[test]
    fn test_infinite_dates_render() {
        let db = Database::open_in_memory(InterceptorChain::new()).unwrap();
        let result = db
            .query("SELECT 'infinity'::DATE AS d, '-infinity'::DATE AS n")
            .unwrap();
        assert_eq!(
            result.rows,
            vec![vec!["infinity".to_string(), "-infinity".to_string()]]
        );
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("score"), "\"score\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
