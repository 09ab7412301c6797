//! Logging setup for the CLI: tracing events go to stderr so query output on
//! stdout stays clean for piping.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Level for this crate's events given `-q` and the number of `-v` flags
pub fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the filter: `RUST_LOG` wins when set, otherwise the verbosity flags
/// pick this crate's level and everything else stays at `warn`.
pub fn build_env_filter(verbose: u8, quiet: bool) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = level_for(verbose, quiet);
    let base = if quiet { "error" } else { "warn" };
    let filter_str = format!("{},dynamic_tablename={}", base, level);
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter_str, e))
}

pub fn init(verbose: u8, quiet: bool) -> Result<()> {
    let filter = build_env_filter(verbose, quiet)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0, false), "warn");
        assert_eq!(level_for(1, false), "info");
        assert_eq!(level_for(2, false), "debug");
        assert_eq!(level_for(7, false), "trace");
        assert_eq!(level_for(3, true), "error");
    }
}
