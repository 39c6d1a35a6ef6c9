//! Tree command implementation.

use crate::cli::TreeArgs;
use crate::commands::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use serde_json::Value as JsonValue;
use tracing::debug;
use trellis_convert::to_tree;
use trellis_domain::{ExpandSpec, GraphStore, Path};

/// Execute the tree command.
pub fn execute_tree(args: TreeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;

    let mut convert = config.convert_config()?;
    if args.no_sort {
        convert.sort_paths = false;
    }
    let lower_case_rels = config.settings.lower_case_rels && !args.upper_case_rels;

    let mut spec = ExpandSpec::default()
        .with_direction(args.direction.into())
        .with_depth(1, args.max_depth);
    if let Some(rel_type) = &args.rel_type {
        spec = spec.with_type(rel_type.as_str());
    }

    let mut paths = Vec::new();
    for node in store.nodes_with_label(&args.label)? {
        let expanded = store.expand(node.id, &spec)?;
        if expanded.is_empty() {
            // a root without relationships still gets a tree
            paths.push(Path::single(node));
        } else {
            paths.extend(expanded);
        }
    }
    debug!(label = %args.label, paths = paths.len(), "collected paths");

    let trees = to_tree(&paths, lower_case_rels, &convert)?;
    println!("{}", formatter.format_json(&JsonValue::Array(trees))?);
    Ok(())
}
