//! Board listing parsing.
//!
//! Two listing shapes are understood:
//! - `subject.txt`: one `{id}.dat<>{title} ({count})` record per line
//!   (older boards use `,` instead of `<>`)
//! - the board's HTML page, where threads appear as `read.cgi` links

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::models::{ListingFormat, ThreadListingEntry};

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("link selector is valid"));

/// `read.cgi` thread link, capturing the thread id.
static THREAD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/test/read\.cgi/[^/]+/(\d+)").expect("thread link pattern is valid")
});

/// Parse a listing response in the given format. Unusable lines are skipped.
pub fn parse_listing(raw: &str, format: ListingFormat) -> Vec<ThreadListingEntry> {
    match format {
        ListingFormat::Subject => parse_subject(raw),
        ListingFormat::Html => parse_html(raw),
    }
}

fn parse_subject(raw: &str) -> Vec<ThreadListingEntry> {
    let mut entries = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, title)) = line.split_once("<>").or_else(|| line.split_once(',')) else {
            log::debug!("Skipping listing line without delimiter: {line}");
            continue;
        };
        let thread_id = key.trim().trim_end_matches(".dat");
        if thread_id.is_empty() || thread_id.contains(char::is_whitespace) {
            log::debug!("Skipping listing line with bad thread id: {line}");
            continue;
        }
        entries.push(ThreadListingEntry::new(thread_id, strip_count(title)));
    }
    entries
}

fn parse_html(raw: &str) -> Vec<ThreadListingEntry> {
    let document = Html::parse_document(raw);
    let mut entries: Vec<ThreadListingEntry> = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(caps) = THREAD_LINK.captures(href) else {
            continue;
        };
        let thread_id = &caps[1];
        if entries.iter().any(|e| e.thread_id == thread_id) {
            continue;
        }
        let text = element.text().collect::<String>();
        let title = strip_count(strip_ordinal(text.trim()));
        if title.is_empty() {
            continue;
        }
        entries.push(ThreadListingEntry::new(thread_id, title));
    }
    entries
}

/// Drop a trailing ` (123)` response counter.
fn strip_count(title: &str) -> String {
    let title = title.trim();
    if let Some(body) = title.strip_suffix(')') {
        if let Some(idx) = body.rfind('(') {
            let count = &body[idx + 1..];
            if !count.is_empty() && count.chars().all(|c| c.is_ascii_digit()) {
                return body[..idx].trim_end().to_string();
            }
        }
    }
    title.to_string()
}

/// Drop a leading `12: ` position marker used on board index pages.
fn strip_ordinal(text: &str) -> &str {
    match text.split_once(':') {
        Some((num, rest)) if !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()) => {
            rest.trim_start()
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subject_txt() {
        let raw = "1700000900.dat<>なんJNVA部★301 (812)\n\
                   1700000300.dat<>Grok画像スレ (15)\n";
        let entries = parse_listing(raw, ListingFormat::Subject);
        assert_eq!(
            entries,
            vec![
                ThreadListingEntry::new("1700000900", "なんJNVA部★301"),
                ThreadListingEntry::new("1700000300", "Grok画像スレ"),
            ]
        );
    }

    #[test]
    fn parses_comma_delimited_subject() {
        let entries = parse_listing("1600000000.dat,RTX 4090 (3)", ListingFormat::Subject);
        assert_eq!(entries, vec![ThreadListingEntry::new("1600000000", "RTX 4090")]);
    }

    #[test]
    fn skips_broken_subject_lines() {
        let raw = "garbage line\n\n.dat<>no id (1)\n1700000000.dat<>ok (2)";
        let entries = parse_listing(raw, ListingFormat::Subject);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].thread_id, "1700000000");
    }

    #[test]
    fn keeps_parentheses_that_are_not_counts() {
        assert_eq!(strip_count("Part (ver2)"), "Part (ver2)");
        assert_eq!(strip_count("Part (12)"), "Part");
    }

    #[test]
    fn parses_html_board_page() {
        let raw = r#"<html><body>
            <a href="https://fate.5ch.net/test/read.cgi/liveuranus/1700000900/l50">1: なんJNVA部★301 (812)</a>
            <a href="/test/read.cgi/liveuranus/1700000300/l50">2: 雑談 (15)</a>
            <a href="https://fate.5ch.net/test/read.cgi/liveuranus/1700000900/">dup</a>
            <a href="/liveuranus/">board top</a>
        </body></html>"#;
        let entries = parse_listing(raw, ListingFormat::Html);
        assert_eq!(
            entries,
            vec![
                ThreadListingEntry::new("1700000900", "なんJNVA部★301"),
                ThreadListingEntry::new("1700000300", "雑談"),
            ]
        );
    }

    #[test]
    fn html_pages_parse_independently() {
        let first = r#"<a href="/test/read.cgi/cg/1700000001/">Grok (3)</a>"#;
        let second = r#"<a href="/test/read.cgi/jisaku/1600000002/">RTX 5090 (9)</a>"#;

        assert_eq!(
            parse_listing(first, ListingFormat::Html),
            vec![ThreadListingEntry::new("1700000001", "Grok")]
        );
        assert_eq!(
            parse_listing(second, ListingFormat::Html),
            vec![ThreadListingEntry::new("1600000002", "RTX 5090")]
        );
        assert!(parse_listing("<p>no links</p>", ListingFormat::Html).is_empty());
    }
}
