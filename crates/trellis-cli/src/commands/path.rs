//! Path command implementation.

use crate::cli::{PathArgs, ShapeArg};
use crate::commands::read_input;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use tracing::debug;
use trellis_convert::{from_json_list, from_json_map, json_path};

/// Execute the path command.
pub fn execute_path(args: PathArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let json = read_input(&args.input)?;

    let options: Option<Vec<String>> = if args.no_options {
        Some(Vec::new())
    } else if !args.options.is_empty() {
        Some(args.options)
    } else {
        config.settings.default_path_options.clone()
    };
    debug!(path = ?args.path, ?options, "evaluating path");

    let path = args.path.as_deref();
    let options = options.as_deref();
    let result = match args.shape {
        ShapeArg::Value => json_path(&json, path, options)?,
        ShapeArg::List => from_json_list(&json, path, options)?,
        ShapeArg::Map => from_json_map(&json, path, options)?,
    };

    println!("{}", formatter.format_json(&result)?);
    Ok(())
}
