//! Archive targets and the boards they live on.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// A named thread to track: a board plus the keywords identifying the thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    /// Stable identifier, also the checkpoint key and archive directory name
    pub id: String,

    /// Board the thread is listed on
    pub board: BoardRef,

    /// Keywords that must all appear in the thread title
    #[serde(rename = "keywords")]
    pub criteria: KeywordSet,
}

impl Target {
    pub fn new(id: impl Into<String>, board: BoardRef, criteria: KeywordSet) -> Self {
        Self {
            id: id.into(),
            board,
            criteria,
        }
    }
}

/// Handle to a board: enough to build listing and thread requests.
///
/// Parsed from a board URL such as `https://mevius.5ch.net/cg/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoardRef {
    scheme: String,
    host: String,
    board: String,
}

impl BoardRef {
    /// Parse a board URL into its scheme, host and board path.
    pub fn parse(board_url: &str) -> Result<Self> {
        let url = Url::parse(board_url.trim())?;
        let host = url
            .host_str()
            .ok_or_else(|| AppError::config(format!("Board URL has no host: {board_url}")))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let board = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .ok_or_else(|| AppError::config(format!("Board URL has no board path: {board_url}")))?
            .to_string();

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            board,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn board(&self) -> &str {
        &self.board
    }

    /// Canonical board URL with a trailing slash.
    pub fn url(&self) -> String {
        format!("{}://{}/{}/", self.scheme, self.host, self.board)
    }

    /// Substitute `{scheme}`, `{host}` and `{board}` in a URL template.
    pub fn fill(&self, template: &str) -> String {
        template
            .replace("{scheme}", &self.scheme)
            .replace("{host}", &self.host)
            .replace("{board}", &self.board)
    }
}

impl TryFrom<String> for BoardRef {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<BoardRef> for String {
    fn from(board: BoardRef) -> Self {
        board.url()
    }
}

impl fmt::Display for BoardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Conjunctive keyword criteria. Every keyword must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keywords.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True when no usable keyword is present.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|k| k.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_board_url() {
        let board = BoardRef::parse("https://mevius.5ch.net/cg/").unwrap();
        assert_eq!(board.scheme(), "https");
        assert_eq!(board.host(), "mevius.5ch.net");
        assert_eq!(board.board(), "cg");
        assert_eq!(board.url(), "https://mevius.5ch.net/cg/");
    }

    #[test]
    fn parses_board_url_without_trailing_slash_and_with_port() {
        let board = BoardRef::parse("http://localhost:8080/liveuranus").unwrap();
        assert_eq!(board.host(), "localhost:8080");
        assert_eq!(board.board(), "liveuranus");
    }

    #[test]
    fn rejects_board_url_without_path() {
        assert!(BoardRef::parse("https://egg.5ch.net/").is_err());
        assert!(BoardRef::parse("not a url").is_err());
    }

    #[test]
    fn fills_url_template() {
        let board = BoardRef::parse("https://egg.5ch.net/jisaku/").unwrap();
        assert_eq!(
            board.fill("{scheme}://{host}/{board}/subject.txt"),
            "https://egg.5ch.net/jisaku/subject.txt"
        );
    }

    #[test]
    fn deserializes_target_from_toml() {
        let target: Target = toml::from_str(
            r#"
            id = "cg_grok"
            board = "https://mevius.5ch.net/cg/"
            keywords = ["Grok", "part"]
            "#,
        )
        .unwrap();
        assert_eq!(target.id, "cg_grok");
        assert_eq!(target.board.board(), "cg");
        assert_eq!(target.criteria.iter().collect::<Vec<_>>(), vec!["Grok", "part"]);
    }

    #[test]
    fn blank_keywords_count_as_empty() {
        assert!(KeywordSet::new(["  ", ""]).is_empty());
        assert!(!KeywordSet::new(["RTX"]).is_empty());
    }
}
