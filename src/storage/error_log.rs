//! Timestamped failure log.
//!
//! One line per failure, appended: `[2025-01-01T09:00:00+09:00] target: cause`.

use std::path::Path;

use chrono::{Local, SecondsFormat};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::storage::LocalStorage;

/// Append-only error channel shared by all targets of a run.
#[derive(Debug)]
pub struct ErrorLog {
    storage: LocalStorage,
    key: String,
    lock: Mutex<()>,
}

impl ErrorLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let (storage, key) = LocalStorage::for_file(path.as_ref());
        Self {
            storage,
            key,
            lock: Mutex::new(()),
        }
    }

    /// Append one failure line.
    pub async fn record(&self, target_id: &str, cause: &str) -> Result<()> {
        let ts = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        let cause = cause.replace('\n', " ");
        let line = format!("[{ts}] {target_id}: {cause}\n");

        let _guard = self.lock.lock().await;
        self.storage.append_bytes(&self.key, line.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn appends_timestamped_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("error.log");
        let log = ErrorLog::new(&path);

        log.record("cg_grok", "no matching thread").await.unwrap();
        log.record("jisaku_rtx", "HTTP error:\n503").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] cg_grok: no matching thread"));
        assert!(lines[1].ends_with("] jisaku_rtx: HTTP error: 503"));
    }
}
