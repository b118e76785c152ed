//! `umami-seed`: seed or remove the Umami demo content.
//!
//! # Responsibility
//! - Parse flags/env into a seeding configuration.
//! - Wire the SQLite content store and run one seeder operation.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use umami_seed_core::db::open_db;
use umami_seed_core::{
    core_version, default_log_level, init_logging, sqlite_seeder, ContentLocator, DeleteSummary,
    ImportSummary, PublicFiles, RowErrorPolicy, SeedError,
};

#[derive(Parser)]
#[command(name = "umami-seed")]
#[command(about = "Import or delete the Umami demo content", version)]
struct Cli {
    /// SQLite content store to seed
    #[arg(long, env = "UMAMI_SEED_DB", default_value = "umami.sqlite3")]
    db: PathBuf,

    /// Directory containing `default_content/` (defaults to the bundled content)
    #[arg(long, env = "UMAMI_SEED_CONTENT_DIR")]
    content_dir: Option<PathBuf>,

    /// Directory backing `public://` files
    #[arg(long, env = "UMAMI_SEED_PUBLIC_DIR", default_value = "files")]
    public_dir: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, env = "UMAMI_SEED_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset
    #[arg(long, env = "UMAMI_SEED_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import all demo content and record it in the ledger
    Import {
        /// abort|skip: what to do when a data row fails
        #[arg(long, env = "UMAMI_SEED_ON_ROW_ERROR", default_value = "abort")]
        on_row_error: RowErrorPolicy,
    },

    /// Delete everything recorded in the ledger
    Delete,

    /// Show how many seeded entities the ledger holds per type
    Status,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
    init_logging(level, cli.log_dir.as_deref()).map_err(|err| anyhow!(err))?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open content store `{}`", cli.db.display()))?;
    let locator = cli
        .content_dir
        .map(ContentLocator::new)
        .unwrap_or_else(ContentLocator::bundled);
    let files = PublicFiles::new(cli.public_dir);
    let seeder = sqlite_seeder(&conn, locator, files);

    match cli.command {
        Command::Import { on_row_error } => {
            let summary = seeder
                .with_row_error_policy(on_row_error)
                .import_content()
                .context("import failed; run `delete` to remove what was created")?;
            print_import(&summary);
        }
        Command::Delete => match seeder.delete_imported_content() {
            Ok(summary) => print_delete(&summary),
            Err(SeedError::DeleteFailed { failures, summary }) => {
                print_delete(&summary);
                for failure in &failures {
                    eprintln!("  {}: {}", failure.entity_type, failure.message);
                }
                return Err(anyhow!(
                    "{} failure(s) during delete; affected entities remain in the ledger",
                    failures.len()
                ));
            }
            Err(err) => return Err(err).context("delete failed"),
        },
        Command::Status => {
            let counts = seeder.ledger().counts().context("failed to read ledger")?;
            if counts.is_empty() {
                println!("ledger is empty");
            }
            for (entity_type, count) in counts {
                println!("{:<14} {count}", entity_type.as_str());
            }
        }
    }

    Ok(())
}

fn print_import(summary: &ImportSummary) {
    for step in &summary.steps {
        let note = if step.source_found { "" } else { " (no data file)" };
        println!(
            "{:<15} created={} skipped={}{note}",
            step.step.as_str(),
            step.created,
            step.skipped
        );
    }
    for (entity_type, count) in &summary.created {
        println!("  + {count} {entity_type}");
    }
}

fn print_delete(summary: &DeleteSummary) {
    for (entity_type, count) in &summary.deleted {
        println!("  - {count} {entity_type}");
    }
    if summary.missing > 0 {
        println!("{} ledgered entities were already gone", summary.missing);
    }
}
