use anyhow::Result;
use dynamic_tablename::config::AppConfig;
use std::path::PathBuf;

pub fn run(config: &AppConfig, output: Option<PathBuf>) -> Result<()> {
    match config.source {
        Some(ref path) => eprintln!("# loaded from {}", path.display()),
        None => eprintln!("# no config file found, using defaults and flags"),
    }

    let yaml = config.to_yaml_config();
    print!("{}", yaml.to_yaml()?);

    if let Some(path) = output {
        yaml.save(&path)?;
        eprintln!("Wrote config to {}", path.display());
    }
    Ok(())
}
