//! Dynamic table name interceptor.
//!
//! Replaces each table reference in a statement with whatever the configured
//! [`TableNameResolver`] returns for it. With a [`TenantPrefixResolver`] this
//! sends the eligible tables of the current school to `{school}_{table}`.

use super::table_names::find_table_refs;
use super::StatementInterceptor;
use crate::tenant::{TableNameResolver, TenantConfig, TenantPrefixResolver};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

pub struct DynamicTableNameInterceptor {
    resolver: Arc<dyn TableNameResolver>,
}

impl DynamicTableNameInterceptor {
    pub fn new(resolver: Arc<dyn TableNameResolver>) -> Self {
        Self { resolver }
    }

    /// Interceptor applying the school prefix rule of `config`
    pub fn for_tenant(config: Arc<TenantConfig>) -> Self {
        Self::new(Arc::new(TenantPrefixResolver::new(config)))
    }

    /// Rewrite every table reference in `sql`
    pub fn rewrite<'s>(&self, sql: &'s str) -> Cow<'s, str> {
        let refs = find_table_refs(sql);
        if refs.is_empty() {
            return Cow::Borrowed(sql);
        }

        let mut out: Option<String> = None;
        let mut copied_to = 0;

        for table in &refs {
            let resolved = self.resolver.resolve(sql, &table.name);
            trace!(table = %table.name, resolved = %resolved, "resolved table name");
            if resolved == table.name {
                continue;
            }

            debug!(from = %table.name, to = %resolved, "rewrote table name");
            let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 32));
            buf.push_str(&sql[copied_to..table.span.start]);
            table.quote.write_quoted(&resolved, buf);
            copied_to = table.span.end;
        }

        match out {
            Some(mut buf) => {
                buf.push_str(&sql[copied_to..]);
                Cow::Owned(buf)
            }
            None => Cow::Borrowed(sql),
        }
    }
}

impl StatementInterceptor for DynamicTableNameInterceptor {
    fn name(&self) -> &'static str {
        "dynamic-table-name"
    }

    fn before_prepare<'s>(&self, sql: &'s str) -> Cow<'s, str> {
        self.rewrite(sql)
    }
}

impl fmt::Debug for DynamicTableNameInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicTableNameInterceptor").finish_non_exhaustive()
    }
}
