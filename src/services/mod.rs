//! Service layer for the archiver.
//!
//! This module contains the per-stage logic of a synchronization run:
//! - Text canonicalization (`Normalizer`)
//! - Board listing parsing (`parse_listing`)
//! - Thread selection (`ThreadMatcher`)
//! - Listing and delta requests (`DeltaFetcher`)
//! - Post record parsing (`PostParser`)

mod fetcher;
mod listing;
mod matcher;
mod normalizer;
mod parser;

pub use fetcher::{DeltaFetcher, FetchPlan, RawDelta};
pub use listing::parse_listing;
pub use matcher::{ThreadMatcher, compare_thread_ids};
pub use normalizer::{CanonicalNormalizer, IdentityNormalizer, Normalizer};
pub use parser::{ParseOutcome, ParseWindow, ParsedRecord, PostParser};
