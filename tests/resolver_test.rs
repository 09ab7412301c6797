//! Tests for the school-prefix table name rule.

use dynamic_tablename::tenant::{
    PassthroughResolver, TableNameResolver, TenantConfig, TenantPrefixResolver,
};
use std::sync::Arc;
use std::thread;

fn resolver(school: Option<&str>, tables: &[&str]) -> TenantPrefixResolver {
    TenantPrefixResolver::new(Arc::new(TenantConfig::new(
        school.map(str::to_string),
        tables.iter().copied(),
    )))
}

const SAMPLE_TABLES: &[&str] = &["score", "student", "subject", "exam", "Score", "", "a b"];

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn test_empty_school_name_leaves_eligible_table() {
    let r = resolver(Some(""), &["score"]);
    assert_eq!(r.resolve("SELECT * FROM score", "score"), "score");
}

#[test]
fn test_eligible_table_gets_prefix() {
    let r = resolver(Some("lincoln"), &["score"]);
    assert_eq!(r.resolve("SELECT * FROM score", "score"), "lincoln_score");
}

#[test]
fn test_ineligible_table_unchanged() {
    let r = resolver(Some("lincoln"), &["score"]);
    assert_eq!(r.resolve("SELECT * FROM student", "student"), "student");
}

#[test]
fn test_empty_eligible_set_unchanged() {
    let r = resolver(Some("lincoln"), &[]);
    assert_eq!(r.resolve("SELECT * FROM score", "score"), "score");
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_no_school_never_rewrites() {
    for school in [None, Some("")] {
        let r = resolver(school, SAMPLE_TABLES);
        for t in SAMPLE_TABLES {
            assert_eq!(r.resolve("", t), *t, "school={:?} table={:?}", school, t);
        }
    }
}

#[test]
fn test_only_members_are_prefixed() {
    let r = resolver(Some("N"), &["score", "exam"]);
    for t in SAMPLE_TABLES {
        let expected = if *t == "score" || *t == "exam" {
            format!("N_{}", t)
        } else {
            t.to_string()
        };
        assert_eq!(r.resolve("", t), expected);
    }
}

#[test]
fn test_membership_is_exact() {
    let r = resolver(Some("lincoln"), &["score"]);
    assert_eq!(r.resolve("", "Score"), "Score");
    assert_eq!(r.resolve("", "score "), "score ");
    assert_eq!(r.resolve("", " score"), " score");
    assert_eq!(r.resolve("", "SCORE"), "SCORE");
    assert_eq!(r.resolve("", "scores"), "scores");
}

#[test]
fn test_sql_text_does_not_affect_result() {
    let r = resolver(Some("lincoln"), &["score"]);
    let sqls = ["", "SELECT 1", "DELETE FROM student", "not sql at all"];
    for sql in sqls {
        assert_eq!(r.resolve(sql, "score"), "lincoln_score");
        assert_eq!(r.resolve(sql, "student"), "student");
    }
}

#[test]
fn test_repeated_calls_agree() {
    let r = resolver(Some("lincoln"), &["score"]);
    let first = r.resolve("", "score").into_owned();
    let second = r.resolve("", "score").into_owned();
    assert_eq!(first, second);
}

#[test]
fn test_school_name_used_verbatim() {
    let r = resolver(Some("St. Mary's"), &["score"]);
    assert_eq!(r.resolve("", "score"), "St. Mary's_score");
}

#[test]
fn test_empty_string_can_be_eligible() {
    let r = resolver(Some("lincoln"), &[""]);
    assert_eq!(r.resolve("", ""), "lincoln_");
}

#[test]
fn test_duplicate_tables_collapse() {
    let config = TenantConfig::new(Some("lincoln".to_string()), ["score", "score"]);
    assert_eq!(config.eligible_tables().len(), 1);
}

// =============================================================================
// Other resolvers
// =============================================================================

#[test]
fn test_passthrough_resolver() {
    assert_eq!(PassthroughResolver.resolve("", "score"), "score");
}

#[test]
fn test_closure_resolver() {
    let upper = |_sql: &str, table: &str| table.to_uppercase();
    assert_eq!(upper.resolve("", "score"), "SCORE");
}

#[test]
fn test_concurrent_reads() {
    let r = Arc::new(resolver(Some("lincoln"), &["score"]));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let r = Arc::clone(&r);
            thread::spawn(move || {
                for _ in 0..1000 {
                    let table = if i % 2 == 0 { "score" } else { "student" };
                    let expected = if i % 2 == 0 { "lincoln_score" } else { "student" };
                    assert_eq!(r.resolve("", table), expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
