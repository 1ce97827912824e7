use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use folio::clock::SystemClock;
use folio::config::{Cli, Config};
use folio::state::AppState;
use folio::storage::SqliteStorage;
use folio::{commands, db};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::debug!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;

    let state = AppState::new(
        config,
        Arc::new(SqliteStorage::new(pool)),
        Arc::new(SystemClock),
    );

    let output = commands::run(&state, cli.command)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
