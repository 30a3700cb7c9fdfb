//! Metanyx CLI application entry point
//!
//! Indexes filesystem metadata into a local SQLite store, queries it, and
//! applies batch mutations (touch, time shift, chmod, rename) to the matching
//! files, keeping the store in sync with the disk.
//!
//! # Usage
//!
//! ```bash
//! # Index a directory tree
//! metanyx read ./src
//!
//! # List indexed files below a directory (trailing separator means list)
//! metanyx view ./src/
//!
//! # Search by extension and modification date
//! metanyx view --ext rs --mtime-from 2024-10-01 --json
//!
//! # Shift mtime back 45 seconds on every .log file, refreshing ctime
//! metanyx wri --op time --mtime -45s --ctime-touch --ext log --yes
//!
//! # Preview a rename
//! metanyx wri --op rename --new-name notes.md ./todo.txt --dry-run
//! ```
//!
//! # Configuration
//!
//! Defaults are read from `~/.config/metanyx/config.toml` (if present), an
//! optional `--config` file and `METANYX_*` environment variables. Command-line
//! flags win over all of them. Log verbosity follows `-v` or `METANYX_LOG`.

use clap::CommandFactory;
use std::io;
use tracing_subscriber::EnvFilter;

use metanyx::{
    MetanyxError,
    cli::{Cli, Commands},
    commands::{self, read::ReadOptions, wri::WriArgs},
    completions,
    config::MetanyxConfig,
    db::Database,
};

type Result<T> = std::result::Result<T, MetanyxError>;

/// Install the stderr log subscriber
///
/// `METANYX_LOG` takes precedence; otherwise `-v` raises the level from warn.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("METANYX_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("metanyx={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Dispatch a parsed command line
///
/// # Errors
///
/// Returns `MetanyxError` if configuration loading fails, the store cannot be
/// opened, or the command handler returns an error.
fn run(cli: Cli) -> Result<()> {
    let config = MetanyxConfig::load(cli.config.as_deref())?;
    let format = cli.get_output_format().unwrap_or(config.output);
    let quiet = cli.quiet || config.quiet;
    let db_path = cli.db.clone().unwrap_or_else(|| config.database.clone());
    tracing::debug!(db = %db_path.display(), ?format, "configuration resolved");

    // Neither of these touches the store
    match &cli.command {
        Commands::Info => return commands::info(&db_path, format),
        Commands::Completions { shell } => {
            completions::generate_static(*shell, &mut Cli::command(), &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let db = Database::open(&db_path)?;
    let directive = cli.command.directive();

    match &cli.command {
        Commands::Read {
            target,
            clear,
            files_only,
            keep_going,
        } => {
            let opts = ReadOptions {
                clear: *clear,
                files_only: *files_only,
                keep_going: *keep_going,
            };
            commands::read(&db, target, opts, format, quiet)?;
        }
        Commands::View {
            target,
            mode,
            filters,
            fields,
        } => {
            let filters = filters.to_filters()?;
            let fields = if fields.is_empty() { &config.fields } else { fields };
            commands::view(
                &db,
                target.as_deref(),
                mode.map(Into::into),
                &filters,
                fields,
                format,
            )?;
        }
        Commands::Wri {
            target,
            mode,
            filters,
            dry_run,
            yes,
            ..
        } => {
            let directive = directive.ok_or_else(|| {
                MetanyxError::InvalidInput("wri requires an operation".into())
            })?;
            let filters = filters.to_filters()?;
            let args = WriArgs {
                target: target.as_deref(),
                mode: mode.map(Into::into),
                filters: &filters,
                directive: &directive,
                dry_run: *dry_run,
                yes: *yes,
            };
            commands::wri(&db, &args, format, quiet)?;
        }
        Commands::Clear => commands::clear(&db, format, quiet)?,
        Commands::Info | Commands::Completions { .. } => {}
    }

    db.close()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
