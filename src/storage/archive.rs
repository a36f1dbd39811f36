//! Per-target, per-thread archive files.
//!
//! Each (target, thread) pair owns one text file under
//! `{archive_dir}/{target}/{thread}_{title}.txt`. The file opens with a header
//! block written on the first append, followed by one block per post.
//!
//! The writer does not deduplicate. Replaying the same posts after a crash
//! appends them again; exactly-once is the job of the checkpoint commit that
//! follows a successful append.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Post, Target, ThreadMatch};
use crate::storage::{ArchiveStorage, LocalStorage};
use crate::utils::safe_filename;

/// Local filesystem archive writer.
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    storage: LocalStorage,
}

impl ArchiveWriter {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Relative key of the thread's archive, and whether it already exists.
    ///
    /// An existing file is found by its thread id prefix so a retitled thread
    /// keeps writing to the same archive.
    pub async fn locate(&self, target: &Target, thread: &ThreadMatch) -> Result<(String, bool)> {
        let dir = safe_filename(&target.id);
        let prefix = format!("{}_", safe_filename(&thread.thread_id));

        let existing = self
            .storage
            .list(&dir)
            .await?
            .into_iter()
            .find(|name| name.starts_with(&prefix) && name.ends_with(".txt"));

        Ok(match existing {
            Some(name) => (format!("{dir}/{name}"), true),
            None => {
                let name = format!("{prefix}{}.txt", safe_filename(&thread.title));
                (format!("{dir}/{name}"), false)
            }
        })
    }

    fn header(target: &Target, thread: &ThreadMatch) -> String {
        format!(
            "# {}\n# board: {}\n# thread: {}\n\n",
            thread.title, target.board, thread.thread_id
        )
    }
}

#[async_trait]
impl ArchiveStorage for ArchiveWriter {
    async fn append(
        &self,
        target: &Target,
        thread: &ThreadMatch,
        prior_seq: u64,
        posts: &[Post],
    ) -> Result<u64> {
        let Some(new_last) = posts.iter().map(|p| p.seq).max() else {
            return Ok(prior_seq);
        };

        let (key, exists) = self.locate(target, thread).await?;

        let mut buffer = String::new();
        if !exists {
            buffer.push_str(&Self::header(target, thread));
        }
        for post in posts {
            buffer.push_str(&post.to_block());
        }

        self.storage.append_bytes(&key, buffer.as_bytes()).await?;
        log::debug!("{}: appended {} post(s) to {}", target.id, posts.len(), key);

        Ok(new_last)
    }
}
