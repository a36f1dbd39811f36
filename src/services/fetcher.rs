//! Listing and delta requests.
//!
//! The fetcher decides *what* to ask for; the transport does the asking.
//! Errors of either request are reported as fetch failures for the target and
//! never touch the checkpoint.

use crate::error::{AppError, Result};
use crate::models::{FetchConfig, FetchStrategy, Target, ThreadListingEntry};
use crate::services::listing::parse_listing;
use crate::services::parser::ParseWindow;
use crate::utils::http::Transport;

/// A thread request and the part of the thread its response covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub url: String,
    pub window: ParseWindow,
}

/// Raw thread content fetched for a plan.
#[derive(Debug, Clone)]
pub struct RawDelta {
    pub content: String,
    pub window: ParseWindow,
}

/// Builds and issues listing and thread requests for targets.
pub struct DeltaFetcher<'a> {
    transport: &'a dyn Transport,
    config: &'a FetchConfig,
}

impl<'a> DeltaFetcher<'a> {
    pub fn new(transport: &'a dyn Transport, config: &'a FetchConfig) -> Self {
        Self { transport, config }
    }

    /// URL of the board listing for a target.
    pub fn listing_url(&self, target: &Target) -> String {
        self.with_proxy(target.board.fill(&self.config.listing_url))
    }

    /// Request needed to see every post after `from_seq`.
    ///
    /// A checkpoint already at `u64::MAX` has no next post to ask for and is
    /// reported as a fetch failure for the target.
    pub fn plan(&self, target: &Target, thread_id: &str, from_seq: u64) -> Result<FetchPlan> {
        let (template, window) = match self.config.strategy {
            FetchStrategy::Range => (&self.config.range_url, ParseWindow::suffix(from_seq)),
            FetchStrategy::Full => (&self.config.full_url, ParseWindow::full(from_seq)),
        };
        let start = from_seq.checked_add(1).ok_or_else(|| {
            AppError::fetch(
                &target.id,
                format!("checkpoint {from_seq} of thread {thread_id} has no next post"),
            )
        })?;
        let url = target
            .board
            .fill(template)
            .replace("{thread}", thread_id)
            .replace("{start}", &start.to_string());

        Ok(FetchPlan {
            url: self.with_proxy(url),
            window: window.capped(self.config.max_posts_per_run),
        })
    }

    /// Fetch and parse the board listing.
    pub async fn fetch_listing(&self, target: &Target) -> Result<Vec<ThreadListingEntry>> {
        let url = self.listing_url(target);
        let raw = self
            .transport
            .fetch(&url)
            .await
            .map_err(|e| AppError::fetch(&target.id, format!("listing {url}: {e}")))?;
        let entries = parse_listing(&raw, self.config.listing_format);
        log::debug!("{}: {} thread(s) listed on {}", target.id, entries.len(), target.board);
        Ok(entries)
    }

    /// Fetch thread content covering posts after `from_seq`.
    pub async fn fetch_delta(
        &self,
        target: &Target,
        thread_id: &str,
        from_seq: u64,
    ) -> Result<RawDelta> {
        let plan = self.plan(target, thread_id, from_seq)?;
        let content = self
            .transport
            .fetch(&plan.url)
            .await
            .map_err(|e| AppError::fetch(&target.id, format!("thread {}: {e}", plan.url)))?;
        Ok(RawDelta {
            content,
            window: plan.window,
        })
    }

    fn with_proxy(&self, url: String) -> String {
        if self.config.proxy_prefix.is_empty() {
            url
        } else {
            format!("{}{}", self.config.proxy_prefix, url)
        }
    }
}
