//! Tenant configuration for table name prefixing.
//!
//! A tenant (a school) shares the schema with every other tenant but keeps
//! its rows in physically separate tables named `{school}_{table}`. Only the
//! tables enrolled in the eligible set are prefixed; everything else is shared.
//!
//! The configuration is built once at startup and handed around as an
//! `Arc<TenantConfig>`. Nothing mutates it afterwards.

mod resolver;

pub use resolver::{PassthroughResolver, TableNameResolver, TenantPrefixResolver};

use ahash::AHashSet;

/// Tenant identity plus the tables that receive its prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantConfig {
    /// School name; `None` or empty means single-tenant mode
    tenant_name: Option<String>,
    /// Table names eligible for prefixing (exact, case-sensitive)
    eligible_tables: AHashSet<String>,
}

impl TenantConfig {
    /// Create a configuration from a tenant name and its eligible tables
    pub fn new<I, S>(tenant_name: Option<String>, eligible_tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tenant_name,
            eligible_tables: eligible_tables.into_iter().map(Into::into).collect(),
        }
    }

    /// Configuration that never prefixes anything
    pub fn single_tenant() -> Self {
        Self::default()
    }

    /// The configured tenant name. An empty name is reported as unset.
    pub fn tenant_name(&self) -> Option<&str> {
        self.tenant_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Tables enrolled for prefixing
    pub fn eligible_tables(&self) -> &AHashSet<String> {
        &self.eligible_tables
    }

    /// Exact membership test, no case folding or trimming
    pub fn is_eligible(&self, table_name: &str) -> bool {
        self.eligible_tables.contains(table_name)
    }

    pub fn is_multi_tenant(&self) -> bool {
        self.tenant_name().is_some()
    }

    /// Eligible tables in sorted order, for display
    pub fn sorted_tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self.eligible_tables.iter().map(String::as_str).collect();
        tables.sort_unstable();
        tables
    }
}
