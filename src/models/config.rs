//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Target;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and fetch behavior settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Output and state file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Threads to archive
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.max_concurrent == 0 {
            return Err(AppError::validation("fetch.max_concurrent must be > 0"));
        }
        if !self.fetch.full_url.contains("{thread}") {
            return Err(AppError::validation("fetch.full_url must contain {thread}"));
        }
        if !self.fetch.range_url.contains("{thread}") || !self.fetch.range_url.contains("{start}")
        {
            return Err(AppError::validation(
                "fetch.range_url must contain {thread} and {start}",
            ));
        }
        if self.targets.is_empty() {
            return Err(AppError::validation("No targets defined"));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.id.trim().is_empty() {
                return Err(AppError::validation("Target with empty id"));
            }
            if !seen.insert(target.id.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate target id: {}",
                    target.id
                )));
            }
            if target.criteria.is_empty() {
                return Err(AppError::validation(format!(
                    "Target {} has no keywords",
                    target.id
                )));
            }
        }
        Ok(())
    }

    /// Resolve relative paths against a base directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.paths.archive_dir,
            &mut self.paths.state_file,
            &mut self.paths.error_log,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// How thread posts are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Request only the suffix starting after the checkpoint
    #[default]
    Range,
    /// Request the whole thread and filter locally
    Full,
}

/// Shape of a post record line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordLayout {
    /// `name<>contact<>date<>body<>extra`, number taken from line position
    #[default]
    Positional,
    /// `seq<>name<>contact<>date<>body<>extra`, number declared per line
    Numbered,
}

/// Shape of a board listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingFormat {
    /// `subject.txt`: `{id}.dat<>{title} ({count})` per line
    #[default]
    Subject,
    /// Board HTML page with `read.cgi` thread links
    Html,
}

/// HTTP client and fetch behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum number of targets synchronized at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Delay after each finished target in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    #[serde(default)]
    pub strategy: FetchStrategy,

    #[serde(default)]
    pub record_layout: RecordLayout,

    #[serde(default)]
    pub listing_format: ListingFormat,

    /// Fallback charset when the response does not declare one
    #[serde(default = "defaults::encoding")]
    pub encoding: String,

    /// Prepended to every request URL. The relay must return the raw
    /// subject/dat text; a relay that renders pages to prose leaves every
    /// record malformed.
    #[serde(default)]
    pub proxy_prefix: String,

    /// Cap on posts archived per target per run, 0 for no cap
    #[serde(default)]
    pub max_posts_per_run: u64,

    #[serde(default = "defaults::listing_url")]
    pub listing_url: String,

    #[serde(default = "defaults::range_url")]
    pub range_url: String,

    #[serde(default = "defaults::full_url")]
    pub full_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            request_delay_ms: 0,
            strategy: FetchStrategy::default(),
            record_layout: RecordLayout::default(),
            listing_format: ListingFormat::default(),
            encoding: defaults::encoding(),
            proxy_prefix: String::new(),
            max_posts_per_run: 0,
            listing_url: defaults::listing_url(),
            range_url: defaults::range_url(),
            full_url: defaults::full_url(),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root directory of per-target archives
    #[serde(default = "defaults::archive_dir")]
    pub archive_dir: PathBuf,

    /// Checkpoint store file
    #[serde(default = "defaults::state_file")]
    pub state_file: PathBuf,

    /// Timestamped failure log
    #[serde(default = "defaults::error_log")]
    pub error_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            archive_dir: defaults::archive_dir(),
            state_file: defaults::state_file(),
            error_log: defaults::error_log(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; thread-archiver/0.1)".into()
    }
    pub fn timeout() -> u64 {
        20
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn encoding() -> String {
        "utf-8".into()
    }
    pub fn listing_url() -> String {
        "{scheme}://{host}/{board}/subject.txt".into()
    }
    pub fn range_url() -> String {
        "{scheme}://{host}/test/rawmode.cgi/{board}/{thread}/{start}-".into()
    }
    pub fn full_url() -> String {
        "{scheme}://{host}/{board}/dat/{thread}.dat".into()
    }

    pub fn archive_dir() -> PathBuf {
        PathBuf::from("threads")
    }
    pub fn state_file() -> PathBuf {
        PathBuf::from("state.json")
    }
    pub fn error_log() -> PathBuf {
        PathBuf::from("error.log")
    }
}
