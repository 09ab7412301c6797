//! Per-school table routing for a shared database.
//!
//! A school's eligible tables are stored under `{school}_{table}` while every
//! other table stays shared. Application code always names the logical table;
//! [`interceptor::DynamicTableNameInterceptor`] rewrites each statement right
//! before [`store::Database`] prepares it.

pub mod config;
pub mod entity;
pub mod interceptor;
pub mod logging;
pub mod repository;
pub mod schema;
pub mod service;
pub mod store;
pub mod tenant;
