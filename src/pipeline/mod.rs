//! Pipeline entry points.
//!
//! - `run_sync`: one synchronization pass over every configured target

pub mod report;
pub mod rotation;
pub mod sync;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::Config;

pub use report::{NoUpdateReason, RunReport, SyncStatus, TargetOutcome};
pub use rotation::{EffectiveCheckpoint, RotationState};
pub use sync::Synchronizer;

/// Validate the configuration and synchronize every target once.
///
/// Per-target failures are part of the report. Only an invalid configuration
/// or an unreadable checkpoint store fails the run.
pub async fn run_sync(config: &Config, cancel: &CancellationToken) -> Result<RunReport> {
    config.validate()?;

    let synchronizer = Synchronizer::from_config(config).await?;
    log::info!("Synchronizing {} target(s)", config.targets.len());

    let report = synchronizer.run(&config.targets, cancel).await;
    log::info!(
        "Run finished: {} advanced, {} failed, {} post(s) archived",
        report.advanced_count(),
        report.failed_count(),
        report.archived_posts()
    );
    Ok(report)
}
