//! Retype command implementation.

use crate::cli::RetypeArgs;
use crate::commands::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use trellis_domain::RelId;
use trellis_store::set_relationship_type;

/// Execute the retype command.
pub fn execute_retype(args: RetypeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = open_store(config)?;
    let ids: Vec<RelId> = args.ids.iter().copied().map(RelId::new).collect();

    let results = set_relationship_type(&mut store, &ids, &args.new_type);
    println!("{}", formatter.format_updates(&results)?);

    let failed = results.iter().filter(|result| !result.is_success()).count();
    if failed > 0 {
        eprintln!("{}", formatter.warning(&format!("{} of {} relationship(s) not retyped", failed, results.len())));
    }
    Ok(())
}
