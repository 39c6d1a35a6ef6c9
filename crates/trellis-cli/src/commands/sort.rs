//! Sort command implementation.

use crate::cli::SortArgs;
use crate::commands::read_input;
use crate::error::Result;
use crate::output::Formatter;
use serde_json::Value as JsonValue;
use trellis_convert::{json_to_value, lenient, to_sorted_json_map};

/// Execute the sort command.
pub fn execute_sort(args: SortArgs, formatter: &Formatter) -> Result<()> {
    let document = lenient::parse(&read_input(&args.input)?)?;
    let sorted = to_sorted_json_map(&json_to_value(&document), !args.case_sensitive)?;

    // key order survives the round trip
    let value: JsonValue = serde_json::from_str(&sorted)?;
    println!("{}", formatter.format_json(&value)?);
    Ok(())
}
