//! `lifeos` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and `LIFEOS_*` environment variables.
//! - Open durable storage and hand one explicit `TaskStore` to commands.

mod args;
mod commands;

use anyhow::{Context, Result};
use args::{Cli, Command};
use clap::Parser;
use lifeos_core::db::open_db;
use lifeos_core::{
    default_log_level, init_logging, local_today, KvTaskRepository, SqliteKvStorage,
    StoreConfig, TaskStore,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_DB_FILE_NAME: &str = "lifeos.sqlite3";

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lifeos: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir.to_string_lossy()).context("logging setup failed")?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let today = local_today();

    // The assistant never touches task storage.
    if let Command::Ask { prompt } = &cli.command {
        commands::ask(prompt, &mut out)?;
        out.flush()?;
        return Ok(());
    }

    let db_path = cli.db.unwrap_or_else(default_db_path);
    let conn = open_db(&db_path)?;
    let mut store = TaskStore::open(
        KvTaskRepository::new(SqliteKvStorage::new(&conn)),
        StoreConfig::default(),
    );

    commands::execute(&mut store, cli.command, today, &mut out)?;
    out.flush()?;
    Ok(())
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
