//! Generic CRUD over one entity table.
//!
//! Statements are written against the entity's logical table name and go
//! through [`Database`]'s interceptor chain like any other SQL.

use crate::entity::Entity;
use crate::store::Database;
use anyhow::Result;
use duckdb::types::Value;
use duckdb::{params, params_from_iter};
use std::marker::PhantomData;

pub struct Repository<'db, E> {
    db: &'db Database,
    _entity: PhantomData<fn() -> E>,
}

impl<'db, E: Entity> Repository<'db, E> {
    pub fn new(db: &'db Database) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn database(&self) -> &'db Database {
        self.db
    }

    pub fn insert(&self, entity: &E) -> Result<()> {
        self.db
            .execute(&insert_sql::<E>(), params_from_iter(entity.values()))?;
        Ok(())
    }

    /// Insert all entities in one transaction; returns the number inserted
    pub fn insert_batch(&self, entities: &[E]) -> Result<usize> {
        if entities.is_empty() {
            return Ok(0);
        }
        self.db
            .execute_many(&insert_sql::<E>(), entities.iter().map(E::values))
    }

    /// Returns false if no row has the entity's id
    pub fn update_by_id(&self, entity: &E) -> Result<bool> {
        let assignments: Vec<String> = E::COLUMNS[1..]
            .iter()
            .map(|col| format!("{} = ?", col))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            E::TABLE,
            assignments.join(", "),
            E::id_column()
        );

        let mut values: Vec<Value> = entity.values().into_iter().skip(1).collect();
        values.push(Value::BigInt(entity.id()));

        let affected = self.db.execute(&sql, params_from_iter(values))?;
        Ok(affected > 0)
    }

    pub fn delete_by_id(&self, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", E::TABLE, E::id_column());
        let affected = self.db.execute(&sql, params![id])?;
        Ok(affected > 0)
    }

    pub fn select_by_id(&self, id: i64) -> Result<Option<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            E::COLUMNS.join(", "),
            E::TABLE,
            E::id_column()
        );
        self.db.query_row(&sql, params![id], |row| E::from_row(row))
    }

    /// All rows, ordered by id
    pub fn select_list(&self) -> Result<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            E::COLUMNS.join(", "),
            E::TABLE,
            E::id_column()
        );
        self.db.query_map(&sql, [], |row| E::from_row(row))
    }

    pub fn count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let count = self.db.query_row(&sql, [], |row| row.get::<_, i64>(0))?;
        Ok(count.unwrap_or(0))
    }
}

fn insert_sql<E: Entity>() -> String {
    let placeholders = vec!["?"; E::COLUMNS.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        E::COLUMNS.join(", "),
        placeholders
    )
}
