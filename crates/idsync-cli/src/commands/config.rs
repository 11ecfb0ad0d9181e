//! Config command - inspect and check the IdSync configuration file

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::info;

use idsync_core::config::Config;

use crate::output::{get_formatter, plural, OutputFormat};

const REDACTED: &str = "********";

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
    /// Print the configuration file path
    Path,
}

impl ConfigCommand {
    pub fn execute(&self, path: &Path, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(path, format),
            ConfigCommand::Validate => execute_validate(path, format),
            ConfigCommand::Path => {
                let formatter = get_formatter(format);
                formatter.success(&path.display().to_string());
                formatter.print_json(&serde_json::json!({
                    "config_path": path.display().to_string(),
                    "exists": path.exists(),
                }));
                Ok(())
            }
        }
    }
}

/// Effective configuration with the client secret masked
fn redacted(mut config: Config) -> Config {
    if config.directory.client_secret.is_some() {
        config.directory.client_secret = Some(REDACTED.to_string());
    }
    config
}

fn execute_show(path: &Path, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let config = redacted(Config::load_or_default(path));

    info!(config_path = %path.display(), "Showing configuration");

    if format.is_json() {
        let json =
            serde_json::to_value(&config).context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
        return Ok(());
    }

    formatter.success(&format!("Configuration ({})", path.display()));
    if !path.exists() {
        formatter.warn("File not found, showing defaults");
    }
    formatter.info("");
    let yaml =
        serde_yaml::to_string(&config).context("Failed to serialize configuration to YAML")?;
    for line in yaml.lines() {
        formatter.info(line);
    }
    Ok(())
}

fn execute_validate(path: &Path, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);

    if !path.exists() {
        bail!("Configuration file not found at {}", path.display());
    }
    let config = Config::load(path)
        .with_context(|| format!("Failed to parse configuration {}", path.display()))?;

    info!(config_path = %path.display(), "Validating configuration");
    let errors = config.validate();

    if format.is_json() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        formatter.print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": path.display().to_string(),
            "errors": messages,
        }));
    } else if errors.is_empty() {
        formatter.success("Configuration is valid");
        formatter.info(&format!("File: {}", path.display()));
    } else {
        formatter.error(&format!(
            "Configuration has {}:",
            plural(errors.len() as u64, "error")
        ));
        formatter.info(&format!("File: {}", path.display()));
        for error in &errors {
            formatter.info(&format!("  {} - {}", error.field, error.message));
        }
    }

    if !errors.is_empty() {
        bail!("Configuration is invalid");
    }
    Ok(())
}
