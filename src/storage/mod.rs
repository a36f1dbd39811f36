//! Storage for archives, checkpoints and the error log.
//!
//! All three live on the local filesystem through [`LocalStorage`]. Archives
//! are appended and synced; the checkpoint file is replaced atomically; the
//! error log is appended line by line.

pub mod archive;
pub mod checkpoint;
pub mod error_log;
pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Post, Target, ThreadMatch};

// Re-export for convenience
pub use archive::ArchiveWriter;
pub use checkpoint::CheckpointStore;
pub use error_log::ErrorLog;
pub use local::LocalStorage;

/// Trait for archive backends.
#[async_trait]
pub trait ArchiveStorage: Send + Sync {
    /// Append `posts` in order to the thread's archive and make them durable.
    ///
    /// Writes the header first when the thread has no archive yet. An empty
    /// slice is a no-op returning `prior_seq`; otherwise the result is the
    /// highest appended sequence number.
    async fn append(
        &self,
        target: &Target,
        thread: &ThreadMatch,
        prior_seq: u64,
        posts: &[Post],
    ) -> Result<u64>;
}
