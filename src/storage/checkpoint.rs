//! Durable checkpoint store.
//!
//! The whole mapping lives in one JSON file and is loaded once per run. Every
//! commit rewrites the file atomically under a lock, so a crash never leaves a
//! half-written mapping and other targets' committed entries survive.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::Checkpoint;
use crate::storage::LocalStorage;

/// Target id → last committed checkpoint.
#[derive(Debug)]
pub struct CheckpointStore {
    storage: LocalStorage,
    key: String,
    entries: Mutex<BTreeMap<String, Checkpoint>>,
}

impl CheckpointStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. A corrupt file or entry is dropped
    /// with a warning. Any other read failure is returned.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let (storage, key) = LocalStorage::for_file(path.as_ref());
        let entries = match storage.read_bytes(&key).await {
            Ok(Some(bytes)) => decode_entries(&bytes, &key),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::CheckpointUnreadable(format!(
                    "{}: {e}",
                    storage.path(&key).display()
                )));
            }
        };

        log::debug!("Loaded {} checkpoint(s) from {}", entries.len(), key);
        Ok(Self {
            storage,
            key,
            entries: Mutex::new(entries),
        })
    }

    /// Checkpoint for a target, if one was committed.
    pub async fn get(&self, target_id: &str) -> Option<Checkpoint> {
        self.entries.lock().await.get(target_id).cloned()
    }

    /// Copy of every committed checkpoint.
    pub async fn snapshot(&self) -> BTreeMap<String, Checkpoint> {
        self.entries.lock().await.clone()
    }

    /// Record a target's new checkpoint and persist the whole mapping.
    ///
    /// On a failed write the in-memory entry is restored, so nothing later
    /// persists an advance that was never committed.
    pub async fn commit(&self, target_id: &str, checkpoint: Checkpoint) -> Result<()> {
        let mut entries = self.entries.lock().await;

        if let Some(current) = entries.get(target_id) {
            if current.thread_id == checkpoint.thread_id
                && checkpoint.last_seen_seq < current.last_seen_seq
            {
                return Err(AppError::checkpoint_write(
                    target_id,
                    format!(
                        "would move thread {} back from {} to {}",
                        current.thread_id, current.last_seen_seq, checkpoint.last_seen_seq
                    ),
                ));
            }
        }

        let previous = entries.insert(target_id.to_string(), checkpoint);
        if let Err(e) = self.storage.write_json(&self.key, &*entries).await {
            match previous {
                Some(prev) => entries.insert(target_id.to_string(), prev),
                None => entries.remove(target_id),
            };
            return Err(AppError::checkpoint_write(target_id, e));
        }
        Ok(())
    }
}

fn decode_entries(bytes: &[u8], key: &str) -> BTreeMap<String, Checkpoint> {
    let mut entries = BTreeMap::new();

    let map = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            log::warn!("Checkpoint file {key} is not a JSON object, starting fresh");
            return entries;
        }
        Err(e) => {
            log::warn!("Checkpoint file {key} is corrupt ({e}), starting fresh");
            return entries;
        }
    };

    for (target_id, value) in map {
        match serde_json::from_value::<Checkpoint>(value) {
            Ok(checkpoint) => {
                entries.insert(target_id, checkpoint);
            }
            Err(e) => log::warn!("Ignoring corrupt checkpoint for {target_id}: {e}"),
        }
    }
    entries
}
