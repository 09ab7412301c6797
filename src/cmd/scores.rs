use super::{emit, open_database, resolve_format};
use anyhow::Result;
use dynamic_tablename::config::AppConfig;
use dynamic_tablename::entity::StudentScore;
use dynamic_tablename::service::ScoreService;
use dynamic_tablename::store::QueryResult;
use std::path::PathBuf;
use std::time::Instant;

pub fn run(config: &AppConfig, format: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let output_format = resolve_format(format.as_deref(), output.as_deref())?;
    let db = open_database(config)?;

    let start = Instant::now();
    let rows = ScoreService::new(&db).query_student_score()?;
    let result = to_query_result(&rows, start.elapsed().as_secs_f64());

    emit(&result, output_format, output.as_deref())
}

fn to_query_result(rows: &[StudentScore], execution_time_secs: f64) -> QueryResult {
    QueryResult {
        columns: vec![
            "student_name".to_string(),
            "subject_name".to_string(),
            "score".to_string(),
        ],
        column_types: vec![
            "Text".to_string(),
            "Text".to_string(),
            "Int".to_string(),
        ],
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.student_name.clone(),
                    r.subject_name.clone(),
                    r.score.to_string(),
                ]
            })
            .collect(),
        execution_time_secs,
    }
}
