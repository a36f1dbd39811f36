//! Thread archiver CLI
//!
//! Runs one synchronization pass per invocation; schedule it externally.

use std::path::{Path, PathBuf};

use archiver::{
    error::Result,
    models::Config,
    pipeline::{self, SyncStatus},
    storage::CheckpointStore,
};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

/// Incremental forum thread archiver
#[derive(Parser, Debug)]
#[command(
    name = "archiver",
    version,
    about = "Incrementally archives forum threads"
)]

struct Cli {
    /// Path to the configuration file; relative paths inside it resolve
    /// against its directory
    #[arg(short, long, default_value = "storage/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synchronize every target once
    Sync,

    /// Validate the configuration file
    Validate,

    /// Show stored checkpoints
    Status,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load(path)?;
    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    config.resolve_paths(base);
    Ok(config)
}

/// Cancel the token on the first Ctrl-C.
fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, finishing targets already in progress...");
            cancel.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load {}: {}", cli.config.display(), e);
            return Err(e);
        }
    };
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Sync => {
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());

            let report = pipeline::run_sync(&config, &cancel).await?;
            for outcome in &report.outcomes {
                match outcome.status {
                    SyncStatus::Failed(_) => {
                        log::error!("{}: {}", outcome.target_id, outcome.status)
                    }
                    _ => log::info!("{}: {}", outcome.target_id, outcome.status),
                }
            }
            log::info!(
                "Done in {}s",
                (report.finished_at - report.started_at).num_seconds()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} targets)", config.targets.len());
        }

        Command::Status => {
            let store = CheckpointStore::open(&config.paths.state_file).await?;
            let checkpoints = store.snapshot().await;

            log::info!("State file: {}", config.paths.state_file.display());
            for target in &config.targets {
                match checkpoints.get(&target.id) {
                    Some(cp) => log::info!(
                        "{}: thread {} at {}",
                        target.id,
                        cp.thread_id,
                        cp.last_seen_seq
                    ),
                    None => log::info!("{}: no checkpoint yet", target.id),
                }
            }
            for id in checkpoints.keys() {
                if !config.targets.iter().any(|t| &t.id == id) {
                    log::info!("{}: checkpoint kept for unconfigured target", id);
                }
            }
        }
    }

    Ok(())
}
