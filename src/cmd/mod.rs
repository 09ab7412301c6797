mod config;
mod init;
mod query;
mod rewrite;
mod scores;

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use dynamic_tablename::config::AppConfig;
use dynamic_tablename::interceptor::{DynamicTableNameInterceptor, InterceptorChain};
use dynamic_tablename::logging;
use dynamic_tablename::store::{Database, OutputFormat, QueryResult, QueryResultFormatter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dynamic-tablename")]
#[command(version)]
#[command(
    about = "Route per-school tables by prefixing their names with the school name",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// YAML config file (default: ./school.yaml, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// School name used as the table prefix (overrides the config file)
    #[arg(long, global = true, value_name = "NAME")]
    pub school: Option<String>,

    /// Tables that get the school prefix (comma-separated, replaces the config list)
    #[arg(long, global = true, value_name = "TABLES", value_delimiter = ',')]
    pub dynamic_tables: Option<Vec<String>>,

    /// DuckDB database file (default: in-memory)
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Memory limit for DuckDB (e.g., "1GB")
    #[arg(long, global = true, value_name = "LIMIT")]
    pub memory_limit: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl GlobalArgs {
    /// Merge the flags with the config file
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        AppConfig::builder()
            .config_file(self.config.clone())
            .discover(self.config.is_none())
            .school_name(self.school.clone())
            .dynamic_tables(self.dynamic_tables.clone())
            .database_path(self.database.clone())
            .memory_limit(self.memory_limit.clone())
            .build()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how a statement is rewritten for the configured school
    Rewrite {
        /// SQL statement to rewrite
        #[arg(value_name = "SQL", required_unless_present = "table")]
        sql: Option<String>,

        /// Resolve a single table name instead of a statement
        #[arg(short, long, value_name = "NAME", conflicts_with = "sql")]
        table: Option<String>,
    },

    /// Create the student, subject and score tables for the configured school
    Init {
        /// Drop the school's tables first
        #[arg(long)]
        drop: bool,

        /// Insert a small demo data set
        #[arg(long)]
        seed: bool,
    },

    /// List every score of the configured school with student and subject names
    Scores {
        /// Output format: table, json, jsonl, csv, tsv (default: from --output extension, else table)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Run SQL through the table-name interceptor
    Query(query::QueryArgs),

    /// Print the effective configuration as YAML
    Config {
        /// Also write it to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        generate(
            shell,
            &mut Cli::command(),
            "dynamic-tablename",
            &mut io::stdout(),
        );
        return Ok(());
    }

    logging::init(cli.global.verbose, cli.global.quiet)?;
    let config = cli.global.load_config()?;

    match cli.command {
        Commands::Rewrite { sql, table } => rewrite::run(&config, sql, table),
        Commands::Init { drop, seed } => init::run(&config, drop, seed),
        Commands::Scores { format, output } => scores::run(&config, format, output),
        Commands::Query(args) => query::run(&config, args),
        Commands::Config { output } => config::run(&config, output),
        Commands::Completions { .. } => Ok(()),
    }
}

/// Open the configured database with the school's table-name interceptor
pub(crate) fn open_database(config: &AppConfig) -> anyhow::Result<Database> {
    let chain = InterceptorChain::new().with(DynamicTableNameInterceptor::for_tenant(config.tenant()));
    Database::open(&config.database, chain)
}

/// Explicit `--format` first, then the output file extension, then table
pub(crate) fn resolve_format(
    format: Option<&str>,
    output: Option<&Path>,
) -> anyhow::Result<OutputFormat> {
    match format {
        Some(f) => f.parse().map_err(|e: String| anyhow::anyhow!(e)),
        None => Ok(output
            .and_then(OutputFormat::from_extension)
            .unwrap_or_default()),
    }
}

/// Print a result to stdout, or write it to `output` when given
pub(crate) fn emit(
    result: &QueryResult,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let formatted = QueryResultFormatter::format(result, format);

    if let Some(output_path) = output {
        let file = File::create(output_path)
            .with_context(|| format!("Cannot create output file: {}", output_path.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(formatted.as_bytes())?;
        writer.flush()?;
        eprintln!(
            "Wrote {} rows to {}",
            result.row_count(),
            output_path.display()
        );
    } else {
        print!("{}", formatted);
    }
    Ok(())
}
