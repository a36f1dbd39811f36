//! Utility functions and helpers.

pub mod http;

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

const MAX_FILENAME_GRAPHEMES: usize = 80;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("unsafe char pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Turn arbitrary text into a file name component.
///
/// Path separators, reserved characters and whitespace runs become `_`, the
/// result is cut to 80 graphemes so multi-byte titles never split a character.
pub fn safe_filename(text: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(text.trim(), "_");
    let replaced = WHITESPACE.replace_all(&replaced, "_");
    let cut: String = replaced
        .graphemes(true)
        .take(MAX_FILENAME_GRAPHEMES)
        .collect();

    if cut.is_empty() || cut.chars().all(|c| c == '.') {
        "untitled".to_string()
    } else {
        cut
    }
}
