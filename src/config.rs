//! Configuration management for the ledgerwire tools

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

/// File read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "ledgerwire.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Largest stdin payload (hex text, in bytes) the decoder will accept.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    /// Print the derived identifier before the JSON body.
    #[serde(default = "default_show_hash")]
    pub show_hash: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
            show_hash: default_show_hash(),
        }
    }
}

fn default_max_input_bytes() -> usize {
    8 * 1024 * 1024
}

fn default_pretty() -> bool {
    true
}

fn default_show_hash() -> bool {
    true
}

impl Config {
    pub fn from_toml_str(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config = toml::from_str(config_str)?;

        if config.limits.max_input_bytes == 0 {
            return Err("limits.max_input_bytes must be greater than zero".into());
        }

        Ok(config)
    }
}

/// Loads `path` if given; otherwise `ledgerwire.toml` when present, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config_str = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?,
        None => read_optional(Path::new(DEFAULT_CONFIG_FILE))?,
    };

    if config_str.trim().is_empty() {
        tracing::debug!("no configuration found, using defaults");
        return Ok(Config::default());
    }

    Config::from_toml_str(&config_str)
}

/// Reads a config file that may be absent. Only a missing file reads as empty.
fn read_optional(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    match fs::read_to_string(path) {
        Ok(config_str) => Ok(config_str),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(format!("failed to read config {}: {}", path.display(), e).into()),
    }
}
