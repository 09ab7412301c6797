//! Table name resolution.
//!
//! A resolver maps the logical table name found in a statement to the
//! physical one. It is called once per table reference while a statement is
//! being prepared, on the caller's thread, and must not block.

use super::TenantConfig;
use std::borrow::Cow;
use std::sync::Arc;

/// Maps a logical table name to the physical table name.
///
/// `sql` is the statement the name was found in. Resolvers may ignore it;
/// the tenant rule does.
pub trait TableNameResolver: Send + Sync {
    fn resolve<'t>(&self, sql: &str, table_name: &'t str) -> Cow<'t, str>;
}

/// Plain handler functions work as resolvers
impl<F> TableNameResolver for F
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn resolve<'t>(&self, sql: &str, table_name: &'t str) -> Cow<'t, str> {
        Cow::Owned(self(sql, table_name))
    }
}

/// Leaves every table name alone
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

impl TableNameResolver for PassthroughResolver {
    fn resolve<'t>(&self, _sql: &str, table_name: &'t str) -> Cow<'t, str> {
        Cow::Borrowed(table_name)
    }
}

/// Prefixes eligible tables with `{tenant}_`
#[derive(Debug, Clone)]
pub struct TenantPrefixResolver {
    config: Arc<TenantConfig>,
}

impl TenantPrefixResolver {
    pub fn new(config: Arc<TenantConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TenantConfig {
        &self.config
    }
}

impl TableNameResolver for TenantPrefixResolver {
    fn resolve<'t>(&self, _sql: &str, table_name: &'t str) -> Cow<'t, str> {
        match self.config.tenant_name() {
            Some(tenant) if self.config.is_eligible(table_name) => {
                Cow::Owned(format!("{}_{}", tenant, table_name))
            }
            _ => Cow::Borrowed(table_name),
        }
    }
}
