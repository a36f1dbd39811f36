//! Local filesystem primitives shared by the archive, checkpoint and error log
//! files.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml           # Targets and fetch settings
//! ├── state.json            # Checkpoints, one entry per target
//! ├── error.log             # Timestamped per-target failures
//! └── threads/              # Archives (append-only)
//!     └── {target}/
//!         └── {thread}_{title}.txt
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Local filesystem storage rooted at a directory. Keys are relative paths.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Split a file path into a storage rooted at its parent and its key.
    pub fn for_file(path: &Path) -> (Self, String) {
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (Self::new(root), key)
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, sync, then rename).
    pub async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Append bytes and sync them to disk before returning.
    pub async fn append_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }

    /// Write JSON data.
    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    pub async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// File names directly under `dir_key`, empty if the directory is missing.
    pub async fn list(&self, dir_key: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(self.path(dir_key)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(AppError::Io(e)),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!storage.path("test.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let data = storage.read_bytes("nope.txt").await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_append_creates_dirs_and_appends() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.append_bytes("a/b/log.txt", b"one\n").await.unwrap();
        storage.append_bytes("a/b/log.txt", b"two\n").await.unwrap();

        let data = storage.read_bytes("a/b/log.txt").await.unwrap().unwrap();
        assert_eq!(data, b"one\ntwo\n");
    }

    #[tokio::test]
    async fn test_json_roundtrip_and_list() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_json("dir/x.json", &vec![1, 2, 3]).await.unwrap();
        storage.append_bytes("dir/a.txt", b"").await.unwrap();
        let bytes = storage.read_bytes("dir/x.json").await.unwrap().unwrap();
        let loaded: Vec<u32> = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(loaded, vec![1, 2, 3]);
        assert_eq!(storage.list("dir").await.unwrap(), vec!["a.txt", "x.json"]);
        assert!(storage.list("missing").await.unwrap().is_empty());
    }

    #[test]
    fn test_for_file_splits_path() {
        let (storage, key) = LocalStorage::for_file(Path::new("/data/state.json"));
        assert_eq!(storage.path(&key), Path::new("/data/state.json"));
        assert_eq!(key, "state.json");

        let (storage, key) = LocalStorage::for_file(Path::new("state.json"));
        assert_eq!(storage.path(&key), Path::new("./state.json"));
        assert_eq!(key, "state.json");
    }
}
