// src/models/mod.rs

//! Domain models for the archiver.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod checkpoint;
mod config;
mod post;
mod target;
mod thread;

// Re-export all public types
pub use checkpoint::Checkpoint;
pub use config::{Config, FetchConfig, FetchStrategy, ListingFormat, PathsConfig, RecordLayout};
pub use post::Post;
pub use target::{BoardRef, KeywordSet, Target};
pub use thread::{MatchResult, ThreadListingEntry, ThreadMatch};
