use super::Entity;
use duckdb::types::Value;
use duckdb::Row;
use serde::{Deserialize, Serialize};

/// One student's mark in one subject. This is the per-school table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub score: i32,
}

impl Score {
    pub fn new(id: i64, student_id: i64, subject_id: i64, score: i32) -> Self {
        Self {
            id,
            student_id,
            subject_id,
            score,
        }
    }
}

impl Entity for Score {
    const TABLE: &'static str = "score";
    const COLUMNS: &'static [&'static str] = &["id", "student_id", "subject_id", "score"];

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::BigInt(self.id),
            Value::BigInt(self.student_id),
            Value::BigInt(self.subject_id),
            Value::Int(self.score),
        ]
    }

    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            student_id: row.get(1)?,
            subject_id: row.get(2)?,
            score: row.get(3)?,
        })
    }
}

/// Join of score, student and subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentScore {
    pub student_name: String,
    pub subject_name: String,
    pub score: i32,
}

impl StudentScore {
    pub(crate) fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            student_name: row.get(0)?,
            subject_name: row.get(1)?,
            score: row.get(2)?,
        })
    }
}
