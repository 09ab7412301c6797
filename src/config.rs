//! Application configuration.
//!
//! Settings come from a YAML file and command-line overrides:
//!
//! ```yaml
//! school:
//!   name: lincoln
//!   dynamic-tables: [score]
//! database:
//!   path: schools.duckdb
//!   memory-limit: 1GB
//! ```
//!
//! CLI values win over the file; anything unset falls back to single-tenant
//! mode with an in-memory database.

use crate::store::DatabaseConfig;
use crate::tenant::TenantConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name looked up when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = "school.yaml";

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    tenant: Arc<TenantConfig>,
    pub database: DatabaseConfig,
    /// File the settings were read from, if any
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Shared, read-only tenant settings
    pub fn tenant(&self) -> Arc<TenantConfig> {
        Arc::clone(&self.tenant)
    }

    /// Convert back to the file layout, for display or saving
    pub fn to_yaml_config(&self) -> AppYamlConfig {
        AppYamlConfig {
            school: Some(SchoolSection {
                name: self.tenant.tenant_name().map(str::to_string),
                dynamic_tables: self
                    .tenant
                    .sorted_tables()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            }),
            database: Some(DatabaseSection {
                path: self.database.path.clone(),
                memory_limit: self.database.memory_limit.clone(),
            }),
        }
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config_file: Option<PathBuf>,
    discover: bool,
    school_name: Option<String>,
    dynamic_tables: Option<Vec<String>>,
    database_path: Option<PathBuf>,
    memory_limit: Option<String>,
}

impl AppConfigBuilder {
    /// Explicit config file; it must exist
    pub fn config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Look in the default locations when no file is given
    pub fn discover(mut self, discover: bool) -> Self {
        self.discover = discover;
        self
    }

    pub fn school_name(mut self, name: Option<String>) -> Self {
        self.school_name = name;
        self
    }

    /// Replaces the file's table list when set
    pub fn dynamic_tables(mut self, tables: Option<Vec<String>>) -> Self {
        self.dynamic_tables = tables;
        self
    }

    pub fn database_path(mut self, path: Option<PathBuf>) -> Self {
        self.database_path = path;
        self
    }

    pub fn memory_limit(mut self, limit: Option<String>) -> Self {
        self.memory_limit = limit;
        self
    }

    /// Build the AppConfig
    pub fn build(self) -> anyhow::Result<AppConfig> {
        let source = match self.config_file {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path)
            }
            None if self.discover => discover_config_file(),
            None => None,
        };

        let yaml = match source {
            Some(ref path) => AppYamlConfig::load(path)?,
            None => AppYamlConfig::default(),
        };

        let school = yaml.school.unwrap_or_default();
        let database = yaml.database.unwrap_or_default();

        // CLI overrides YAML
        let name = self.school_name.or(school.name);
        let tables = self.dynamic_tables.unwrap_or(school.dynamic_tables);

        Ok(AppConfig {
            tenant: Arc::new(TenantConfig::new(name, tables)),
            database: DatabaseConfig {
                path: self.database_path.or(database.path),
                memory_limit: self.memory_limit.or(database.memory_limit),
            },
            source,
        })
    }
}

/// First existing file among `./school.yaml` and the per-user config dir
pub fn discover_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("dynamic-tablename").join(DEFAULT_CONFIG_FILE))
        .filter(|path| path.is_file())
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppYamlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<SchoolSection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseSection>,
}

/// `school:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchoolSection {
    /// School name; prefixed tables become `{name}_{table}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tables that get the school prefix
    #[serde(default, alias = "dynamic_tables")]
    pub dynamic_tables: Vec<String>,
}

/// `database:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DatabaseSection {
    /// DuckDB file; in-memory when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default, alias = "memory_limit", skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<String>,
}

impl AppYamlConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        // An empty file deserializes to unit, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(content)?)
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_yaml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
