//! DDL and demo data for the student/subject/score tables.
//!
//! DDL names logical tables only, so running [`create_tables`] under a school
//! creates that school's physical tables (`lincoln_score`) next to the shared
//! ones.

use crate::entity::{Entity, Score, Student, Subject};
use crate::service::{CrudService, ScoreService, StudentService, SubjectService};
use crate::store::Database;
use anyhow::{Context, Result};
use tracing::info;

const CREATE_TABLES: &[(&str, &str)] = &[
    (
        Student::TABLE,
        "CREATE TABLE IF NOT EXISTS student (id BIGINT PRIMARY KEY, name VARCHAR NOT NULL)",
    ),
    (
        Subject::TABLE,
        "CREATE TABLE IF NOT EXISTS subject (id BIGINT PRIMARY KEY, name VARCHAR NOT NULL)",
    ),
    (
        Score::TABLE,
        "CREATE TABLE IF NOT EXISTS score (\
            id BIGINT PRIMARY KEY, \
            student_id BIGINT NOT NULL, \
            subject_id BIGINT NOT NULL, \
            score INTEGER NOT NULL)",
    ),
];

/// Create any missing tables; returns the logical names in creation order
pub fn create_tables(db: &Database) -> Result<Vec<&'static str>> {
    let mut created = Vec::with_capacity(CREATE_TABLES.len());
    for (table, ddl) in CREATE_TABLES {
        db.execute_batch(ddl)
            .with_context(|| format!("Failed to create table {}", table))?;
        info!(table, "ensured table");
        created.push(*table);
    }
    Ok(created)
}

/// Drop the current school's view of every table
pub fn drop_tables(db: &Database) -> Result<()> {
    for (table, _) in CREATE_TABLES.iter().rev() {
        db.execute_batch(&format!("DROP TABLE IF EXISTS {}", table))
            .with_context(|| format!("Failed to drop table {}", table))?;
    }
    Ok(())
}

/// Counts of rows inserted by [`seed_demo_data`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedStats {
    pub students: usize,
    pub subjects: usize,
    pub scores: usize,
}

/// Insert a small fixed data set. Shared tables are only filled when empty,
/// so seeding a second school reuses the first school's students.
pub fn seed_demo_data(db: &Database) -> Result<SeedStats> {
    let mut stats = SeedStats::default();

    let students = StudentService::new(db);
    if students.count()? == 0 {
        let rows = [
            Student::new(1, "Alice"),
            Student::new(2, "Bob"),
            Student::new(3, "Carol"),
        ];
        stats.students = students.save_batch(&rows)?;
    }

    let subjects = SubjectService::new(db);
    if subjects.count()? == 0 {
        let rows = [Subject::new(1, "Math"), Subject::new(2, "Physics")];
        stats.subjects = subjects.save_batch(&rows)?;
    }

    let scores = ScoreService::new(db);
    if scores.count()? == 0 {
        let rows = [
            Score::new(1, 1, 1, 92),
            Score::new(2, 1, 2, 85),
            Score::new(3, 2, 1, 78),
            Score::new(4, 2, 2, 88),
            Score::new(5, 3, 1, 95),
        ];
        stats.scores = scores.save_batch(&rows)?;
    }

    info!(
        students = stats.students,
        subjects = stats.subjects,
        scores = stats.scores,
        "seeded demo data"
    );
    Ok(stats)
}
