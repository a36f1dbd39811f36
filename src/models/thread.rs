//! Thread listing entries and match results.

use serde::{Deserialize, Serialize};

/// One thread as it appears in a board listing. Produced fresh every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadListingEntry {
    pub thread_id: String,
    pub raw_title: String,
}

impl ThreadListingEntry {
    pub fn new(thread_id: impl Into<String>, raw_title: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            raw_title: raw_title.into(),
        }
    }
}

/// The thread selected for a target this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMatch {
    pub thread_id: String,
    pub title: String,
}

/// Matcher output: a thread, or nothing on the board fits the criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Found(ThreadMatch),
    NotFound,
}

impl MatchResult {
    pub fn found(self) -> Option<ThreadMatch> {
        match self {
            MatchResult::Found(m) => Some(m),
            MatchResult::NotFound => None,
        }
    }
}
