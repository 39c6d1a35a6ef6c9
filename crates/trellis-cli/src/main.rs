//! Trellis CLI - Command-line interface for graph/JSON conversion.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use trellis_cli::commands;
use trellis_cli::{Cli, Command, Config, Formatter};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TRELLIS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> trellis_cli::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    // --database applies to this run only; `config` saves the file as loaded
    let mut session = config.clone();
    if let Some(database) = cli.database {
        session.settings.database = Some(database);
    }

    match cli.command {
        Command::Path(args) => commands::execute_path(args, &session, &formatter),
        Command::Sort(args) => commands::execute_sort(args, &formatter),
        Command::Tree(args) => commands::execute_tree(args, &session, &formatter),
        Command::Retype(args) => commands::execute_retype(args, &session, &formatter),
        Command::Load(args) => commands::execute_load(args, &session, &formatter),
        Command::Config(args) => {
            commands::execute_config(args, &mut config, &config_path, format, &formatter)
        }
    }
}
