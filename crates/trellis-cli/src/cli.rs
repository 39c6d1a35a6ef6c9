//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use trellis_domain::Direction;

/// Trellis CLI - Convert between property graphs and JSON.
#[derive(Debug, Parser)]
#[command(name = "trellis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Graph database file
    #[arg(short, long, global = true, env = "TRELLIS_DB")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (compact JSON, ids only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract from a JSON document with a JSONPath expression
    Path(PathArgs),

    /// Print a JSON map with its keys sorted
    Sort(SortArgs),

    /// Fold the paths below labelled nodes into nested documents
    Tree(TreeArgs),

    /// Change the type of stored relationships
    Retype(RetypeArgs),

    /// Load nodes and relationships into the graph database
    Load(LoadArgs),

    /// Show or change settings
    Config(ConfigArgs),
}

/// Where a command reads its JSON from.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Read JSON from a file (`-` for stdin)
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,

    /// JSON text given inline
    #[arg(long)]
    pub json: Option<String>,
}

/// Arguments for the path command.
#[derive(Debug, Parser)]
pub struct PathArgs {
    /// JSONPath expression; the whole document when omitted
    pub path: Option<String>,

    #[command(flatten)]
    pub input: InputArgs,

    /// Path option (repeatable)
    #[arg(short = 'o', long = "option", value_name = "OPTION")]
    pub options: Vec<String>,

    /// Evaluate with no options at all instead of the defaults
    #[arg(long, conflicts_with = "options")]
    pub no_options: bool,

    /// Shape of the result
    #[arg(long = "as", value_enum, default_value = "value")]
    pub shape: ShapeArg,
}

/// Result shapes for the path command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShapeArg {
    /// Whatever the path yields
    Value,
    /// Wrap single results in a list
    List,
    /// Require a map
    Map,
}

/// Arguments for the sort command.
#[derive(Debug, Parser)]
pub struct SortArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Order keys by exact code points instead of ignoring case
    #[arg(long)]
    pub case_sensitive: bool,
}

/// Arguments for the tree command.
#[derive(Debug, Parser)]
pub struct TreeArgs {
    /// Label of the root nodes
    #[arg(short, long)]
    pub label: String,

    /// Only follow relationships of this type
    #[arg(short = 't', long)]
    pub rel_type: Option<String>,

    /// Direction to follow relationships in
    #[arg(long, value_enum, default_value = "outgoing")]
    pub direction: DirectionArg,

    /// Maximum number of hops
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Keep relationship types as stored in tree keys
    #[arg(long)]
    pub upper_case_rels: bool,

    /// Process paths in discovery order
    #[arg(long)]
    pub no_sort: bool,
}

/// Direction argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DirectionArg {
    /// Follow outgoing relationships
    Outgoing,
    /// Follow incoming relationships
    Incoming,
    /// Follow both
    Both,
}

/// Arguments for the retype command.
#[derive(Debug, Parser)]
pub struct RetypeArgs {
    /// New relationship type
    pub new_type: String,

    /// Relationship ids
    #[arg(required = true)]
    pub ids: Vec<i64>,
}

/// Arguments for the load command.
#[derive(Debug, Parser)]
pub struct LoadArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Remove everything before loading
    #[arg(long)]
    pub replace: bool,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show current settings
    Show,

    /// Change a setting
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },

    /// Restore a setting to its default
    Unset {
        /// Setting name
        key: String,
    },

    /// Print the configuration file location
    Path,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => Self::Table,
            CliFormat::Json => Self::Json,
            CliFormat::Quiet => Self::Quiet,
        }
    }
}

impl From<DirectionArg> for Direction {
    fn from(direction: DirectionArg) -> Self {
        match direction {
            DirectionArg::Outgoing => Direction::Outgoing,
            DirectionArg::Incoming => Direction::Incoming,
            DirectionArg::Both => Direction::Both,
        }
    }
}
