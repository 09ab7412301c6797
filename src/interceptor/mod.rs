//! Statement interception.
//!
//! Every statement the store prepares passes through an [`InterceptorChain`]
//! first. Interceptors see the SQL text and may return a rewritten version;
//! they run in registration order, each one seeing the previous output.

mod dynamic_table;
pub mod table_names;

pub use dynamic_table::DynamicTableNameInterceptor;
pub use table_names::{find_table_refs, Quote, TableRef};

use std::borrow::Cow;
use std::fmt;

/// A hook run on SQL text right before the statement is prepared
pub trait StatementInterceptor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Return the SQL to prepare. Return it borrowed when unchanged.
    fn before_prepare<'s>(&self, sql: &'s str) -> Cow<'s, str>;
}

/// Ordered list of interceptors applied to every statement
#[derive(Default)]
pub struct InterceptorChain {
    interceptors: Vec<Box<dyn StatementInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`add`](Self::add)
    pub fn with<I: StatementInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.add(interceptor);
        self
    }

    pub fn add<I: StatementInterceptor + 'static>(&mut self, interceptor: I) {
        self.interceptors.push(Box::new(interceptor));
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Run `sql` through every interceptor in order
    pub fn apply<'s>(&self, sql: &'s str) -> Cow<'s, str> {
        let mut current = Cow::Borrowed(sql);
        for interceptor in &self.interceptors {
            current = match current {
                Cow::Borrowed(s) => interceptor.before_prepare(s),
                Cow::Owned(s) => Cow::Owned(interceptor.before_prepare(&s).into_owned()),
            };
        }
        current
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
