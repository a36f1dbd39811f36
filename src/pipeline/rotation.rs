//! Thread rotation detection.
//!
//! The matched thread is compared with the single stored checkpoint. Equal
//! thread ids continue from the checkpoint; a different id means the old
//! thread closed and numbering restarts at zero in a new archive.

use std::fmt;

use crate::models::{Checkpoint, ThreadMatch};

/// How the matched thread relates to the stored checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationState {
    /// No checkpoint yet for this target
    Fresh,
    /// Same thread as last time
    Continuing,
    /// A newer thread replaced the checkpointed one
    Rotated { previous_thread: String },
}

impl fmt::Display for RotationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationState::Fresh => f.write_str("fresh"),
            RotationState::Continuing => f.write_str("continuing"),
            RotationState::Rotated { previous_thread } => {
                write!(f, "rotated from {previous_thread}")
            }
        }
    }
}

/// Where this run starts for the matched thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveCheckpoint {
    pub thread: ThreadMatch,
    pub from_seq: u64,
    pub state: RotationState,
}

/// Decide between a fresh start, a continuation and a rotation.
pub fn resolve(matched: &ThreadMatch, checkpoint: Option<&Checkpoint>) -> EffectiveCheckpoint {
    let (from_seq, state) = match checkpoint {
        None => (0, RotationState::Fresh),
        Some(cp) if cp.thread_id == matched.thread_id => {
            (cp.last_seen_seq, RotationState::Continuing)
        }
        Some(cp) => (
            0,
            RotationState::Rotated {
                previous_thread: cp.thread_id.clone(),
            },
        ),
    };

    EffectiveCheckpoint {
        thread: matched.clone(),
        from_seq,
        state,
    }
}
