//! Per-target synchronization checkpoint.

use serde::{Deserialize, Serialize};

/// Last archived position for a target.
///
/// `last_seen_seq` never decreases while `thread_id` stays the same; it drops
/// back to zero only when the target rotates onto a new thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(alias = "dat")]
    pub thread_id: String,

    #[serde(alias = "last_res", default)]
    pub last_seen_seq: u64,
}

impl Checkpoint {
    pub fn new(thread_id: impl Into<String>, last_seen_seq: u64) -> Self {
        Self {
            thread_id: thread_id.into(),
            last_seen_seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_field_names() {
        let cp: Checkpoint = serde_json::from_str(r#"{"dat":"1700000000","last_res":42}"#).unwrap();
        assert_eq!(cp, Checkpoint::new("1700000000", 42));
    }

    #[test]
    fn writes_current_field_names() {
        let json = serde_json::to_string(&Checkpoint::new("100", 5)).unwrap();
        assert_eq!(json, r#"{"thread_id":"100","last_seen_seq":5}"#);
    }
}
