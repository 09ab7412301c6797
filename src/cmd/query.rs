//! Query command: run SQL against the school's tables through the interceptor.

use super::{emit, open_database, resolve_format};
use anyhow::Result;
use clap::Args;
use dynamic_tablename::config::AppConfig;
use dynamic_tablename::store::{quote_ident, Database, OutputFormat, QueryResultFormatter};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  dynamic-tablename --school lincoln --dynamic-tables score query \"SELECT * FROM score\"
  dynamic-tablename query \"SELECT * FROM score\" -f json
  dynamic-tablename query \"SELECT * FROM student\" -o students.csv
  dynamic-tablename --database schools.duckdb query --interactive")]
pub struct QueryArgs {
    /// SQL query to execute (omit for --interactive mode)
    #[arg(value_name = "QUERY", required_unless_present = "interactive")]
    pub query: Option<String>,

    /// Output format: table, json, jsonl, csv, tsv (default: from --output extension, else table)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Write output to file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Start interactive query session (REPL)
    #[arg(short, long)]
    pub interactive: bool,

    /// Show query execution time
    #[arg(long)]
    pub timing: bool,
}

pub fn run(config: &AppConfig, args: QueryArgs) -> Result<()> {
    let output_format = resolve_format(args.format.as_deref(), args.output.as_deref())?;
    let db = open_database(config)?;

    if args.interactive {
        return run_repl(&db, output_format, args.timing);
    }

    let query = args
        .query
        .ok_or_else(|| anyhow::anyhow!("Query is required (or use --interactive mode)"))?;
    let result = db.query(&query)?;
    emit(&result, output_format, args.output.as_deref())?;

    if args.timing {
        eprintln!("Query executed in {:.3}s", result.execution_time_secs);
    }
    Ok(())
}

/// Run the interactive REPL
fn run_repl(db: &Database, default_format: OutputFormat, timing: bool) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let history_path = dirs::cache_dir()
        .map(|d| d.join("dynamic-tablename").join("query_history"))
        .unwrap_or_else(|| PathBuf::from(".dynamic_tablename_history"));

    let _ = rl.load_history(&history_path);

    println!("dynamic-tablename query REPL");
    println!("Type .help for available commands, .exit to quit");
    println!();

    let mut current_format = default_format;

    loop {
        match rl.readline("sql> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);

                if trimmed.starts_with('.') {
                    match handle_meta_command(trimmed, db, &mut current_format) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => eprintln!("Error: {:#}", e),
                    }
                    continue;
                }

                match db.query(trimmed) {
                    Ok(result) => {
                        print!("{}", QueryResultFormatter::format(&result, current_format));
                        if timing {
                            eprintln!("({:.3}s)", result.execution_time_secs);
                        }
                    }
                    Err(e) => {
                        eprintln!("Error: {:#}", e);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

/// Handle REPL meta-commands. Returns true if REPL should exit.
fn handle_meta_command(command: &str, db: &Database, format: &mut OutputFormat) -> Result<bool> {
    let (cmd, rest) = match command.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (command, ""),
    };

    match cmd {
        ".exit" | ".quit" | ".q" => {
            println!("Goodbye!");
            return Ok(true);
        }
        ".help" | ".h" | ".?" => {
            println!("Available commands:");
            println!("  .tables              List physical tables");
            println!("  .describe <table>    Describe a table (logical name)");
            println!("  .format <fmt>        Set output format (table, json, jsonl, csv, tsv)");
            println!("  .rewrite <sql>       Show the SQL that would run for this school");
            println!("  .count <table>       Count rows in a table (logical name)");
            println!("  .exit, .quit, .q     Exit the REPL");
            println!();
        }
        ".tables" => {
            for table in db.list_tables()? {
                println!("  {}", table);
            }
        }
        ".describe" | ".desc" => {
            if rest.is_empty() {
                eprintln!("Usage: .describe <table>");
            } else {
                let result = db.describe_table(rest)?;
                print!("{}", QueryResultFormatter::format(&result, OutputFormat::Table));
            }
        }
        ".format" => {
            if rest.is_empty() {
                println!("Current format: {}", format);
                println!("Usage: .format <table|json|jsonl|csv|tsv>");
            } else {
                match rest.parse::<OutputFormat>() {
                    Ok(new_format) => {
                        *format = new_format;
                        println!("Output format set to: {}", format);
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                    }
                }
            }
        }
        ".rewrite" => {
            if rest.is_empty() {
                eprintln!("Usage: .rewrite <sql>");
            } else {
                println!("{}", db.prepare_sql(rest));
            }
        }
        ".count" => {
            if rest.is_empty() {
                eprintln!("Usage: .count <table>");
            } else {
                let sql = format!("SELECT COUNT(*) AS count FROM {}", quote_ident(rest));
                let result = db.query(&sql)?;
                if let Some(row) = result.rows.first() {
                    println!("{}", row[0]);
                }
            }
        }
        _ => {
            eprintln!(
                "Unknown command: {}. Type .help for available commands.",
                cmd
            );
        }
    }

    Ok(false)
}
