use super::open_database;
use anyhow::Result;
use dynamic_tablename::config::AppConfig;
use dynamic_tablename::schema;
use dynamic_tablename::tenant::{TableNameResolver, TenantPrefixResolver};

pub fn run(config: &AppConfig, drop: bool, seed: bool) -> Result<()> {
    let db = open_database(config)?;

    if drop {
        schema::drop_tables(&db)?;
        eprintln!("Dropped existing tables");
    }

    let resolver = TenantPrefixResolver::new(config.tenant());
    for table in schema::create_tables(&db)? {
        eprintln!("  {} -> {}", table, resolver.resolve("", table));
    }

    if seed {
        let stats = schema::seed_demo_data(&db)?;
        eprintln!(
            "Seeded {} students, {} subjects, {} scores",
            stats.students, stats.subjects, stats.scores
        );
    }

    match resolver.config().tenant_name() {
        Some(school) => println!("Initialized tables for school '{}'", school),
        None => println!("Initialized shared tables (no school configured)"),
    }
    Ok(())
}
