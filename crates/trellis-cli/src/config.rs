//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use trellis_convert::ConvertConfig;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Node property filters for `tree`, by label
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nodes: BTreeMap<String, Vec<String>>,

    /// Relationship property filters for `tree`, by type
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rels: BTreeMap<String, Vec<String>>,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Lowercase relationship types when used as tree keys
    #[serde(default = "default_true")]
    pub lower_case_rels: bool,

    /// Process longer paths first when building trees
    #[serde(default = "default_true")]
    pub sort_paths: bool,

    /// Path options used when `path` is given none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_path_options: Option<Vec<String>>,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Graph database file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding the configuration and the default database.
    pub fn dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".trellis"))
    }

    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("config.toml"))
    }

    /// Load configuration from `path`, defaulting when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Database file, falling back to `~/.trellis/graph.db`.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.settings.database {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::dir()?.join("graph.db")),
        }
    }

    /// Tree conversion settings, validated.
    pub fn convert_config(&self) -> Result<ConvertConfig> {
        let config = ConvertConfig {
            sort_paths: self.settings.sort_paths,
            nodes: self.nodes.clone(),
            rels: self.rels.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Set a setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let settings = &mut self.settings;
        match key {
            "lower_case_rels" => settings.lower_case_rels = parse_bool(key, value)?,
            "sort_paths" => settings.sort_paths = parse_bool(key, value)?,
            "color" => settings.color = parse_bool(key, value)?,
            "format" => {
                settings.format = match value.to_lowercase().as_str() {
                    "table" => OutputFormat::Table,
                    "json" => OutputFormat::Json,
                    "quiet" => OutputFormat::Quiet,
                    _ => return Err(CliError::Config(format!("Unknown format '{}'", value))),
                }
            }
            "default_path_options" => {
                let options: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                // checked now rather than on every `path` call
                trellis_convert::PathOptions::parse(Some(options.as_slice()))?;
                settings.default_path_options = Some(options);
            }
            "database" => settings.database = Some(PathBuf::from(value)),
            _ => return Err(CliError::Config(format!("Unknown setting '{}'", key))),
        }
        Ok(())
    }

    /// Restore a setting to its default.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let defaults = Settings::default();
        let settings = &mut self.settings;
        match key {
            "lower_case_rels" => settings.lower_case_rels = defaults.lower_case_rels,
            "sort_paths" => settings.sort_paths = defaults.sort_paths,
            "color" => settings.color = defaults.color,
            "format" => settings.format = defaults.format,
            "default_path_options" => settings.default_path_options = None,
            "database" => settings.database = None,
            _ => return Err(CliError::Config(format!("Unknown setting '{}'", key))),
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lower_case_rels: true,
            sort_paths: true,
            default_path_options: None,
            format: OutputFormat::Table,
            color: true,
            database: None,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("'{}' expects true or false, got '{}'", key, value)))
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
