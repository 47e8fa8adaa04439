//! Configuration management commands.
//!
//! Stores CLI defaults in `~/.hydra-gate/config.toml`. Recognized keys:
//! `jwt-secret`, `jwt-algorithm` and `service`.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::output::{self, OutputFormat};

pub const KEY_JWT_SECRET: &str = "jwt-secret";
pub const KEY_JWT_ALGORITHM: &str = "jwt-algorithm";
pub const KEY_SERVICE: &str = "service";

const KNOWN_KEYS: [&str; 3] = [KEY_JWT_SECRET, KEY_JWT_ALGORITHM, KEY_SERVICE];

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key (jwt-secret, jwt-algorithm, service)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show all configuration
    Show,

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Persistent CLI configuration stored on disk.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl CliConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".hydra-gate").join("config.toml"))
}

/// Load the CLI configuration, returning defaults if the file does not exist.
pub fn load_config() -> Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn save_config(cfg: &CliConfig) -> Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(cfg).context("Failed to serialize config")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Mask secrets for display.
fn display_value(key: &str, value: &str) -> String {
    if key == KEY_JWT_SECRET {
        "<redacted>".to_string()
    } else {
        value.to_string()
    }
}

pub fn execute(cmd: ConfigCommands, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Set { key, value } => {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                bail!("Unknown key '{}'. Expected one of: {}", key, KNOWN_KEYS.join(", "));
            }

            let mut cfg = load_config()?;
            cfg.values.insert(key.clone(), value.clone());
            save_config(&cfg)?;

            let shown = display_value(&key, &value);
            match format {
                OutputFormat::Table => output::print_success(&format!("{} = {}", key, shown)),
                _ => output::print_item(&serde_json::json!({ "key": key, "value": shown }), format)?,
            }
        }

        ConfigCommands::Get { key } => {
            let cfg = load_config()?;
            let value = cfg
                .get(&key)
                .with_context(|| format!("Key '{}' not found", key))?;

            match format {
                OutputFormat::Table => println!("{}", value),
                _ => output::print_item(&serde_json::json!({ "key": key, "value": value }), format)?,
            }
        }

        ConfigCommands::Show => {
            let cfg = load_config()?;

            if cfg.values.is_empty() {
                output::print_info("No configuration values set.");
                return Ok(());
            }

            let shown: BTreeMap<&str, String> = cfg
                .values
                .iter()
                .map(|(k, v)| (k.as_str(), display_value(k, v)))
                .collect();

            match format {
                OutputFormat::Table => {
                    output::print_header("Configuration");
                    for (k, v) in &shown {
                        output::print_detail(k, v);
                    }
                }
                _ => output::print_item(&shown, format)?,
            }
        }

        ConfigCommands::Reset { force } => {
            if !force {
                output::print_info("This will reset all CLI configuration. Use --force to confirm.");
                return Ok(());
            }

            let path = config_path()?;
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }

            output::print_success("Configuration reset to defaults");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip_through_toml() {
        let mut cfg = CliConfig::default();
        cfg.values.insert(KEY_SERVICE.to_string(), "aiwm".to_string());

        let parsed: CliConfig = toml::from_str(&toml::to_string_pretty(&cfg).unwrap()).unwrap();
        assert_eq!(parsed.get(KEY_SERVICE), Some("aiwm"));
        assert_eq!(parsed.get(KEY_JWT_SECRET), None);
    }

    #[test]
    fn test_secret_is_redacted() {
        assert_eq!(display_value(KEY_JWT_SECRET, "hunter2"), "<redacted>");
        assert_eq!(display_value(KEY_SERVICE, "aiwm"), "aiwm");
    }
}
