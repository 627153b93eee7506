mod app;
mod cli;
mod config;
mod effects;
mod logging;
mod ui;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use orbit_core::{FieldValues, TaskKind};
use orbit_engine::{cleanup, remove_document, CleanupOptions, RecordStore};
use orbit_logging::{orbit_info, orbit_warn};

use cli::{Cli, Command, RecordsAction};
use config::AppConfig;
use logging::LogDestination;

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.overrides())?;

    let destination = if cli.verbose {
        LogDestination::Both
    } else {
        LogDestination::File
    };
    logging::initialize(destination, &config.log_path());
    orbit_info!(
        "orbit starting: model={} endpoint={}",
        config.model,
        config.base_url
    );

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let store = open_store(&config)?;
            app::run_shell(&config, store)
        }
        Command::Tasks => {
            print!("{}", ui::render::task_list(TaskKind::default()));
            Ok(())
        }
        Command::Run { task, fields, save } => {
            let task = TaskKind::from_id(&task).with_context(|| {
                format!(
                    "unknown task '{task}' (known: {})",
                    TaskKind::ALL.map(TaskKind::id).join(", ")
                )
            })?;
            let values: FieldValues = fields.into_iter().collect();
            let store = open_store(&config)?;
            app::run_once(&config, store, task, values, save)
        }
        Command::Records { action } => {
            let store = open_store(&config)?;
            let result = run_records(&store, action);
            store.close().context("closing record index")?;
            result
        }
        Command::Cleanup {
            dry_run,
            keep_index,
        } => {
            let store = open_store(&config)?;
            let options = CleanupOptions {
                dry_run,
                keep_index,
                scan_dirs: vec![config.output_dir()],
            };
            let summary = cleanup(&store, &options).context("cleanup failed")?;
            store.close().context("closing record index")?;
            print!("{}", ui::render::cleanup_summary(&summary, dry_run));
            Ok(())
        }
    }
}

fn open_store(config: &AppConfig) -> anyhow::Result<RecordStore> {
    let path = config.index_path();
    RecordStore::open(&path).with_context(|| format!("opening record index {}", path.display()))
}

fn run_records(store: &RecordStore, action: RecordsAction) -> anyhow::Result<()> {
    match action {
        RecordsAction::List => {
            let records = store.fetch_all()?;
            print!("{}", ui::render::records_table(&records));
        }
        RecordsAction::Delete { id } => match store.delete(id)? {
            Some(record) => {
                discard_document(&record.path);
                println!("Deleted record {id} ({})", record.path.display());
            }
            None => anyhow::bail!("no saved record with id {id}"),
        },
    }
    Ok(())
}

/// Best-effort removal of a document whose index row is already gone.
pub(crate) fn discard_document(path: &Path) {
    if let Err(err) = remove_document(path) {
        orbit_warn!("Could not remove {:?}: {}", path, err);
    }
}
