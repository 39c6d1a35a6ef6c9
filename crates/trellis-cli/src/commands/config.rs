//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
///
/// Changes are written to `path` straight away.
pub fn execute_config(
    args: ConfigArgs,
    config: &mut Config,
    path: &Path,
    format: OutputFormat,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let text = match format {
                OutputFormat::Json => serde_json::to_string_pretty(config)?,
                _ => toml::to_string_pretty(config)
                    .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?,
            };
            println!("{}", text.trim_end());
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save_to(path)?;
            println!("{}", formatter.success(&format!("Set {} = {}", key, value)));
        }
        ConfigAction::Unset { key } => {
            config.unset(&key)?;
            config.save_to(path)?;
            println!("{}", formatter.success(&format!("Reset {}", key)));
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}
