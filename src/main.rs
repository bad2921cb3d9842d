use clap::Parser;
use fidx::engine::Engine;
use fidx::logging::{init_logging, LogConfig, LogOutput};
use fidx::sqlite_store::SqliteStore;

use fidx::cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Command::Index(args) = &cli.command;

    let log_config = LogConfig {
        level: args.log_level,
        format: args.log_format,
        output: LogOutput::Stdout,
    };
    init_logging(&log_config)?;

    let config = args.build_config()?;
    let store = SqliteStore::open(args.db.as_std_path(), &config.table, config.hash_field(), config.case_insensitive_database)?;
    let engine = Engine::new(&config, &store)?;

    let outcome = engine.process_paths(&args.paths)?;

    if !outcome.completed {
        anyhow::bail!("one or more paths failed validation; see logged errors above");
    }

    Ok(())
}
