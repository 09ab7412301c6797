//! Integration tests for statement rewriting.

use dynamic_tablename::interceptor::{
    DynamicTableNameInterceptor, InterceptorChain, StatementInterceptor,
};
use dynamic_tablename::tenant::TenantConfig;
use std::borrow::Cow;
use std::sync::Arc;

fn lincoln() -> DynamicTableNameInterceptor {
    DynamicTableNameInterceptor::for_tenant(Arc::new(TenantConfig::new(
        Some("lincoln".to_string()),
        ["score", "exam"],
    )))
}

fn rewrite(sql: &str) -> String {
    lincoln().rewrite(sql).into_owned()
}

// =============================================================================
// Statement positions
// =============================================================================

#[test]
fn test_select() {
    assert_eq!(
        rewrite("SELECT * FROM score WHERE id = 1"),
        "SELECT * FROM lincoln_score WHERE id = 1"
    );
}

#[test]
fn test_insert() {
    assert_eq!(
        rewrite("INSERT INTO score (id, score) VALUES (1, 90)"),
        "INSERT INTO lincoln_score (id, score) VALUES (1, 90)"
    );
}

#[test]
fn test_update() {
    assert_eq!(
        rewrite("UPDATE score SET score = 95 WHERE id = 1"),
        "UPDATE lincoln_score SET score = 95 WHERE id = 1"
    );
}

#[test]
fn test_delete() {
    assert_eq!(
        rewrite("DELETE FROM score WHERE id = 1"),
        "DELETE FROM lincoln_score WHERE id = 1"
    );
}

#[test]
fn test_ddl() {
    assert_eq!(
        rewrite("CREATE TABLE IF NOT EXISTS score (id BIGINT, score INTEGER)"),
        "CREATE TABLE IF NOT EXISTS lincoln_score (id BIGINT, score INTEGER)"
    );
    assert_eq!(
        rewrite("DROP TABLE IF EXISTS score"),
        "DROP TABLE IF EXISTS lincoln_score"
    );
}

#[test]
fn test_three_table_join_rewrites_only_eligible() {
    let sql = "SELECT st.name, su.name, sc.score FROM score sc \
               JOIN student st ON st.id = sc.student_id \
               JOIN subject su ON su.id = sc.subject_id";
    let expected = "SELECT st.name, su.name, sc.score FROM lincoln_score sc \
                    JOIN student st ON st.id = sc.student_id \
                    JOIN subject su ON su.id = sc.subject_id";
    assert_eq!(rewrite(sql), expected);
}

#[test]
fn test_every_eligible_reference() {
    assert_eq!(
        rewrite("SELECT * FROM score s JOIN exam e ON s.id = e.id, student"),
        "SELECT * FROM lincoln_score s JOIN lincoln_exam e ON s.id = e.id, student"
    );
}

// =============================================================================
// Things that must not change
// =============================================================================

#[test]
fn test_literals_and_comments_untouched() {
    let sql = "SELECT 'FROM score' AS label FROM student -- JOIN score\n";
    assert_eq!(rewrite(sql), sql);
}

#[test]
fn test_case_differs_is_not_eligible() {
    assert_eq!(rewrite("SELECT * FROM Score"), "SELECT * FROM Score");
}

#[test]
fn test_unchanged_sql_is_borrowed() {
    let interceptor = lincoln();
    let sql = "SELECT * FROM student";
    assert!(matches!(interceptor.rewrite(sql), Cow::Borrowed(s) if s == sql));
}

#[test]
fn test_quoted_reference_keeps_quote_style() {
    assert_eq!(
        rewrite("SELECT * FROM \"score\""),
        "SELECT * FROM \"lincoln_score\""
    );
    assert_eq!(rewrite("SELECT * FROM `score`"), "SELECT * FROM `lincoln_score`");
}

#[test]
fn test_no_school_configured() {
    let interceptor =
        DynamicTableNameInterceptor::for_tenant(Arc::new(TenantConfig::new(None, ["score"])));
    let sql = "SELECT * FROM score";
    assert_eq!(interceptor.rewrite(sql), sql);
}

// =============================================================================
// Chain
// =============================================================================

#[test]
fn test_chain_runs_interceptor() {
    let chain = InterceptorChain::new().with(lincoln());
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.names(), vec!["dynamic-table-name"]);
    assert_eq!(
        chain.apply("DELETE FROM exam"),
        "DELETE FROM lincoln_exam"
    );
}

#[test]
fn test_empty_chain_is_identity() {
    let chain = InterceptorChain::new();
    assert!(chain.is_empty());
    assert!(matches!(chain.apply("SELECT * FROM score"), Cow::Borrowed(_)));
}

#[test]
fn test_interceptor_trait_object() {
    let boxed: Box<dyn StatementInterceptor> = Box::new(lincoln());
    assert_eq!(
        boxed.before_prepare("SELECT * FROM score"),
        "SELECT * FROM lincoln_score"
    );
}
