use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::error;

use foldersync::fs::CHUNK_SIZE;
use foldersync::logging;
use foldersync::sync::{
    spawn_signal_listener, ExcludePatterns, RunSummary, SyncConfig, SyncEngine, SyncRunner,
};

/// Periodically mirror a source folder onto a replica folder
#[derive(Parser, Debug)]
#[command(name = "foldersync")]
#[command(version)]
#[command(about = "One-way folder mirroring at a fixed interval", long_about = None)]
struct Cli {
    /// Folder to mirror from (never modified)
    #[arg(value_name = "SOURCE_FOLDER")]
    source: PathBuf,

    /// Folder to mirror into (created if missing)
    #[arg(value_name = "REPLICA_FOLDER")]
    replica: PathBuf,

    /// Seconds to wait between passes
    #[arg(value_name = "SYNC_INTERVAL")]
    interval: u64,

    /// File that log lines are appended to (also mirrored to stdout)
    #[arg(value_name = "LOG_FILE")]
    log_file: PathBuf,

    /// Glob of relative paths to leave alone on both sides (repeatable)
    #[arg(short, long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// Read exclude globs from a .gitignore-style file
    #[arg(long, value_name = "FILE")]
    exclude_from: Option<PathBuf>,

    /// Copy buffer size in bytes
    #[arg(long, value_name = "BYTES", default_value_t = CHUNK_SIZE)]
    chunk_size: usize,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if !cli.source.exists() {
        eprintln!("Source folder {} does not exist.", cli.source.display());
        return ExitCode::FAILURE;
    }

    if let Err(err) = logging::init(&cli.log_file, cli.verbose) {
        eprintln!("Error: {:#}", err);
        return ExitCode::FAILURE;
    }

    let once = cli.once;
    match run(cli).await {
        Ok(summary) if once && summary.failed_passes > 0 => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let mut exclude = ExcludePatterns::from_patterns(&cli.exclude)?;
    if let Some(path) = &cli.exclude_from {
        exclude.merge(&ExcludePatterns::load(path)?)?;
    }

    let config = SyncConfig {
        chunk_size: cli.chunk_size,
        exclude,
    };
    let engine = SyncEngine::new(cli.source, cli.replica, config);
    engine.validate()?;

    let shutdown = CancellationToken::new();
    let listener = spawn_signal_listener(shutdown.clone())
        .context("Failed to install signal handlers")?;

    let mut runner = SyncRunner::new(engine, Duration::from_secs(cli.interval), shutdown);
    if cli.once {
        runner = runner.with_max_passes(1);
    }

    let summary = runner.run().await;
    listener.abort();

    Ok(summary)
}
