//! Per-target outcomes and the run summary.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::pipeline::rotation::RotationState;

/// Why a target produced nothing this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoUpdateReason {
    /// No listed thread matched the keywords
    NoMatch,
    /// The thread has no posts past the checkpoint
    NoNewPosts { thread_id: String, at_seq: u64 },
}

/// Result of one target's cycle.
#[derive(Debug)]
pub enum SyncStatus {
    Advanced {
        thread_id: String,
        from_seq: u64,
        to_seq: u64,
        appended: usize,
        skipped: usize,
        rotation: RotationState,
    },
    NoUpdate(NoUpdateReason),
    Failed(AppError),
    /// The run was cancelled before this target started
    Cancelled,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Advanced {
                from_seq,
                to_seq,
                appended,
                skipped,
                rotation,
                ..
            } => {
                write!(f, "advanced from {from_seq} to {to_seq} ({appended} posts")?;
                if *skipped > 0 {
                    write!(f, ", {skipped} malformed skipped")?;
                }
                if let RotationState::Rotated { .. } = rotation {
                    write!(f, ", {rotation}")?;
                }
                f.write_str(")")
            }
            SyncStatus::NoUpdate(NoUpdateReason::NoMatch) => f.write_str("no update (no matching thread)"),
            SyncStatus::NoUpdate(NoUpdateReason::NoNewPosts { .. }) => f.write_str("no update"),
            SyncStatus::Failed(e) => write!(f, "error: {e}"),
            SyncStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// One target's entry in the run report.
#[derive(Debug)]
pub struct TargetOutcome {
    pub target_id: String,
    pub status: SyncStatus,
}

/// Summary of a whole run, outcomes in configuration order.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<TargetOutcome>,
}

impl RunReport {
    pub fn outcome(&self, target_id: &str) -> Option<&SyncStatus> {
        self.outcomes
            .iter()
            .find(|o| o.target_id == target_id)
            .map(|o| &o.status)
    }

    pub fn advanced_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SyncStatus::Advanced { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SyncStatus::Failed(_)))
            .count()
    }

    /// Posts appended across all targets.
    pub fn archived_posts(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                SyncStatus::Advanced { appended, .. } => appended,
                _ => 0,
            })
            .sum()
    }

    /// `target: status` lines for display.
    pub fn lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(|o| format!("{}: {}", o.target_id, o.status))
            .collect()
    }
}
