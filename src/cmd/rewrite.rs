//! Rewrite command: show the physical SQL for the configured school without
//! touching a database.

use anyhow::Result;
use dynamic_tablename::config::AppConfig;
use dynamic_tablename::interceptor::{find_table_refs, DynamicTableNameInterceptor};
use dynamic_tablename::tenant::{TableNameResolver, TenantPrefixResolver};
use std::sync::Arc;

pub fn run(config: &AppConfig, sql: Option<String>, table: Option<String>) -> Result<()> {
    let resolver = TenantPrefixResolver::new(config.tenant());

    if let Some(table) = table {
        println!("{}", resolver.resolve("", &table));
        return Ok(());
    }

    let sql = sql.ok_or_else(|| anyhow::anyhow!("SQL statement is required (or use --table)"))?;
    let interceptor = DynamicTableNameInterceptor::new(Arc::new(resolver.clone()));
    println!("{}", interceptor.rewrite(&sql));

    let refs = find_table_refs(&sql);
    if refs.is_empty() {
        eprintln!("No table references found");
        return Ok(());
    }

    let rewritten = refs
        .iter()
        .filter(|r| resolver.resolve(&sql, &r.name) != r.name)
        .count();
    eprintln!(
        "{} table reference{}, {} rewritten",
        refs.len(),
        if refs.len() == 1 { "" } else { "s" },
        rewritten
    );
    Ok(())
}
