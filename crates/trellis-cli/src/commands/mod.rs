//! Command implementations.

pub mod config;
pub mod load;
pub mod path;
pub mod retype;
pub mod sort;
pub mod tree;

pub use self::config::execute_config;
pub use self::load::execute_load;
pub use self::path::execute_path;
pub use self::retype::execute_retype;
pub use self::sort::execute_sort;
pub use self::tree::execute_tree;

use crate::cli::InputArgs;
use crate::config::Config;
use crate::error::Result;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;
use trellis_store::SqliteGraph;

/// Read the JSON text a command works on: inline, from a file, or stdin.
pub fn read_input(input: &InputArgs) -> Result<String> {
    if let Some(json) = &input.json {
        return Ok(json.clone());
    }
    match &input.file {
        Some(path) if path != Path::new("-") => Ok(fs::read_to_string(path)?),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Open the configured graph database, creating its directory if needed.
pub fn open_store(config: &Config) -> Result<SqliteGraph> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    debug!(path = %path.display(), "opening graph database");
    Ok(SqliteGraph::new(&path)?)
}
