//! Entity definitions.
//!
//! Entities name their *logical* table. Whether a given school reads and
//! writes `score` or `lincoln_score` is decided later, when the statement is
//! prepared.

mod score;
mod student;
mod subject;

pub use score::{Score, StudentScore};
pub use student::Student;
pub use subject::Subject;

use duckdb::types::Value;
use duckdb::Row;

/// A row type stored in one table, keyed by an integer id
pub trait Entity: Sized {
    /// Logical table name
    const TABLE: &'static str;
    /// Column names in storage order; the first one is the id
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;

    /// Values in [`COLUMNS`](Self::COLUMNS) order
    fn values(&self) -> Vec<Value>;

    /// Build from a row selected with [`COLUMNS`](Self::COLUMNS) in order
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self>;

    fn id_column() -> &'static str {
        Self::COLUMNS[0]
    }
}
