//! Config command handler

use std::path::Path;

use anyhow::Result;

use bookmarker_core::Config;

use crate::output::{Output, OutputFormat};

/// Show the effective configuration
pub fn show(
    config: &Config,
    config_path: Option<&Path>,
    db: Option<&Path>,
    output: &Output,
) -> Result<()> {
    let database = match db {
        Some(db) => db.to_path_buf(),
        None => config.database_path(),
    };

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "data_dir": config.data_dir,
                "database": database,
                "log_level": config.log_level,
                "log_file": config.log_file,
            }))?;
        }
        OutputFormat::Quiet => {
            println!("{}", database.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:  {}", config.data_dir.display());
            println!("  database:  {}", database.display());
            println!("  log_level: {}", config.log_level);
            println!(
                "  log_file:  {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}
