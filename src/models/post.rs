//! Post record parsed from a thread.

use serde::{Deserialize, Serialize};

/// A single post. `seq` is 1-based and contiguous within its thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub seq: u64,
    pub author: String,
    pub contact: String,
    pub timestamp: String,
    pub body: String,
}

impl Post {
    /// Render the post as an archive block.
    ///
    /// ```text
    /// [12] name <sage> 2025/01/01(水) 00:00:00.00 ID:abc
    /// body line 1
    /// body line 2
    /// ```
    pub fn to_block(&self) -> String {
        format!(
            "[{}] {} <{}> {}\n{}\n\n",
            self.seq, self.author, self.contact, self.timestamp, self.body
        )
    }
}
