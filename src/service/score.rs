use super::CrudService;
use crate::entity::{Score, StudentScore};
use crate::repository::Repository;
use crate::store::Database;
use anyhow::Result;

/// Joins the school's scores with the shared student and subject tables
const STUDENT_SCORE_SQL: &str = "SELECT st.name AS student_name, su.name AS subject_name, sc.score \
     FROM score sc \
     JOIN student st ON st.id = sc.student_id \
     JOIN subject su ON su.id = sc.subject_id \
     ORDER BY st.id, su.id";

pub struct ScoreService<'db> {
    repo: Repository<'db, Score>,
}

impl<'db> ScoreService<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self {
            repo: Repository::new(db),
        }
    }

    /// Every score of the current school with student and subject names,
    /// ordered by student, then subject
    pub fn query_student_score(&self) -> Result<Vec<StudentScore>> {
        self.repo
            .database()
            .query_map(STUDENT_SCORE_SQL, [], StudentScore::from_row)
    }

    pub fn student_score_sql() -> &'static str {
        STUDENT_SCORE_SQL
    }
}

impl<'db> CrudService<'db> for ScoreService<'db> {
    type Entity = Score;

    fn repository(&self) -> &Repository<'db, Score> {
        &self.repo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::{DynamicTableNameInterceptor, InterceptorChain};
    use crate::schema;
    use crate::tenant::TenantConfig;
    use std::sync::Arc;

    #[test]
    fn test_join_reads_tenant_scores() {
        let tenant = Arc::new(TenantConfig::new(Some("lincoln".to_string()), ["score"]));
        let chain = InterceptorChain::new().with(DynamicTableNameInterceptor::for_tenant(tenant));
        let db = Database::open_in_memory(chain).unwrap();
        schema::create_tables(&db).unwrap();
        schema::seed_demo_data(&db).unwrap();

        let service = ScoreService::new(&db);
        let rows = service.query_student_score().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[0],
            StudentScore {
                student_name: "Alice".to_string(),
                subject_name: "Math".to_string(),
                score: 92,
            }
        );
        assert_eq!(rows[4].student_name, "Carol");
    }

    #[test]
    fn test_join_sql_rewrites_only_score() {
        let tenant = Arc::new(TenantConfig::new(Some("lincoln".to_string()), ["score"]));
        let chain = InterceptorChain::new().with(DynamicTableNameInterceptor::for_tenant(tenant));
        let rewritten = chain.apply(ScoreService::student_score_sql()).into_owned();
        assert!(rewritten.contains("FROM lincoln_score sc"));
        assert!(rewritten.contains("JOIN student st"));
        assert!(rewritten.contains("JOIN subject su"));
        // column named score is left alone
        assert!(rewritten.contains("sc.score"));
    }
}
