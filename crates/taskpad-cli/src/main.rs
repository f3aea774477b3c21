mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use taskpad_core::settings::SettingsStore;
use taskpad_core::storage::{self, Storage};
use taskpad_core::store::TaskStore;
use tracing::info;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    cli::init_tracing(args.verbose, args.quiet)?;

    let data_dir = storage::resolve_data_dir(args.data.as_deref())
        .context("failed to resolve data directory")?;
    info!(data_dir = %data_dir.display(), "starting taskpad");

    let mut tasks = TaskStore::open(
        Storage::open(&data_dir)
            .with_context(|| format!("failed to open storage at {}", data_dir.display()))?,
    );
    let mut settings = SettingsStore::open(
        Storage::open(&data_dir)
            .with_context(|| format!("failed to open storage at {}", data_dir.display()))?,
    );

    commands::dispatch(&mut tasks, &mut settings, args.command)
}
