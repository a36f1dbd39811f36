// src/pipeline/sync.rs

//! Synchronization orchestrator.
//!
//! Per target: listing → match → rotation check → delta fetch → parse →
//! append → checkpoint commit. A target's failure is recorded and the run
//! moves on; the checkpoint only advances after the archive append is durable.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::{Checkpoint, Config, FetchConfig, MatchResult, Target};
use crate::pipeline::report::{NoUpdateReason, RunReport, SyncStatus, TargetOutcome};
use crate::pipeline::rotation::{self, RotationState};
use crate::services::{CanonicalNormalizer, DeltaFetcher, Normalizer, PostParser, ThreadMatcher};
use crate::storage::{ArchiveStorage, ArchiveWriter, CheckpointStore, ErrorLog, LocalStorage};
use crate::utils::http::{HttpTransport, Transport};

/// Runs synchronization passes over a list of targets.
pub struct Synchronizer {
    fetch: FetchConfig,
    transport: Arc<dyn Transport>,
    archive: Arc<dyn ArchiveStorage>,
    checkpoints: Arc<CheckpointStore>,
    error_log: Option<Arc<ErrorLog>>,
    normalizer: Arc<dyn Normalizer>,
}

impl Synchronizer {
    pub fn new(
        fetch: FetchConfig,
        transport: Arc<dyn Transport>,
        archive: Arc<dyn ArchiveStorage>,
        checkpoints: Arc<CheckpointStore>,
    ) -> Self {
        Self {
            fetch,
            transport,
            archive,
            checkpoints,
            error_log: None,
            normalizer: Arc::new(CanonicalNormalizer),
        }
    }

    /// Build the production wiring: HTTP transport, local archive directory,
    /// checkpoint file and error log from `config.paths`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config.fetch)?);
        let archive = Arc::new(ArchiveWriter::new(LocalStorage::new(
            &config.paths.archive_dir,
        )));
        let checkpoints = Arc::new(CheckpointStore::open(&config.paths.state_file).await?);

        Ok(Self::new(config.fetch.clone(), transport, archive, checkpoints)
            .with_error_log(ErrorLog::new(&config.paths.error_log)))
    }

    pub fn with_error_log(mut self, error_log: ErrorLog) -> Self {
        self.error_log = Some(Arc::new(error_log));
        self
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    /// Synchronize every target once.
    ///
    /// Targets run concurrently up to `fetch.max_concurrent`. Cancellation is
    /// honoured between targets: a target that has started finishes its cycle.
    pub async fn run(&self, targets: &[Target], cancel: &CancellationToken) -> RunReport {
        let started_at = Utc::now();
        let delay = Duration::from_millis(self.fetch.request_delay_ms);
        let concurrency = self.fetch.max_concurrent.max(1);

        let mut results: Vec<(usize, TargetOutcome)> = stream::iter(targets.iter().enumerate())
            .map(|(index, target)| async move {
                let status = if cancel.is_cancelled() {
                    SyncStatus::Cancelled
                } else {
                    self.run_target(target).await
                };
                if delay.as_millis() > 0 {
                    tokio::time::sleep(delay).await;
                }
                (
                    index,
                    TargetOutcome {
                        target_id: target.id.clone(),
                        status,
                    },
                )
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);

        RunReport {
            started_at,
            finished_at: Utc::now(),
            outcomes: results.into_iter().map(|(_, outcome)| outcome).collect(),
        }
    }

    /// One target's cycle with its failure recorded.
    async fn run_target(&self, target: &Target) -> SyncStatus {
        match self.sync_target(target).await {
            Ok(status) => {
                match &status {
                    SyncStatus::NoUpdate(NoUpdateReason::NoMatch) => {
                        log::warn!("{}: no thread matches {:?}", target.id, target.criteria);
                        self.record_error(target, "no matching thread in listing")
                            .await;
                    }
                    other => log::debug!("{}: {}", target.id, other),
                }
                status
            }
            Err(e) => {
                log::error!("{}: {}", target.id, e);
                self.record_error(target, &e.to_string()).await;
                SyncStatus::Failed(e)
            }
        }
    }

    /// Run the full cycle for one target.
    pub async fn sync_target(&self, target: &Target) -> Result<SyncStatus> {
        let fetcher = DeltaFetcher::new(self.transport.as_ref(), &self.fetch);

        let listing = fetcher.fetch_listing(target).await?;
        let thread = match ThreadMatcher::new(self.normalizer.as_ref())
            .find(&listing, &target.criteria)
        {
            MatchResult::Found(thread) => thread,
            MatchResult::NotFound => return Ok(SyncStatus::NoUpdate(NoUpdateReason::NoMatch)),
        };

        let checkpoint = self.checkpoints.get(&target.id).await;
        let effective = rotation::resolve(&thread, checkpoint.as_ref());
        if let RotationState::Rotated { previous_thread } = &effective.state {
            log::info!(
                "{}: thread rotated {} -> {} ({})",
                target.id,
                previous_thread,
                thread.thread_id,
                thread.title
            );
        }

        let delta = fetcher
            .fetch_delta(target, &thread.thread_id, effective.from_seq)
            .await?;
        let parsed = PostParser::new(self.fetch.record_layout).parse(&delta.content, delta.window);

        if parsed.posts.is_empty() {
            if parsed.skipped > 0 {
                log::warn!(
                    "{}: {} malformed record(s), nothing to archive",
                    target.id,
                    parsed.skipped
                );
            }
            return Ok(SyncStatus::NoUpdate(NoUpdateReason::NoNewPosts {
                thread_id: thread.thread_id,
                at_seq: effective.from_seq,
            }));
        }

        let new_last = self
            .archive
            .append(target, &effective.thread, effective.from_seq, &parsed.posts)
            .await
            .map_err(|e| AppError::archive(&target.id, e))?;

        self.checkpoints
            .commit(&target.id, Checkpoint::new(&thread.thread_id, new_last))
            .await?;

        Ok(SyncStatus::Advanced {
            thread_id: thread.thread_id,
            from_seq: effective.from_seq,
            to_seq: new_last,
            appended: parsed.posts.len(),
            skipped: parsed.skipped,
            rotation: effective.state,
        })
    }

    async fn record_error(&self, target: &Target, cause: &str) {
        if let Some(error_log) = &self.error_log {
            if let Err(e) = error_log.record(&target.id, cause).await {
                log::warn!("Failed to write error log: {}", e);
            }
        }
    }
}
