// src/services/parser.rs

//! Post record parsing.
//!
//! Each line of a thread response is one record, fields separated by `<>`:
//!
//! ```text
//! name<>contact<>date ID<>body<>extra            (positional)
//! seq<>name<>contact<>date ID<>body<>extra       (numbered)
//! ```
//!
//! A short line is reported as malformed and skipped; it never aborts the
//! batch. Malformed lines still consume their position, so positional
//! numbering stays aligned with the thread.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Post, RecordLayout};

/// `<br>` with at most one space on each side, the thread's encoded newline.
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ?<br> ?").expect("line break pattern is valid"));

const FIELD_DELIMITER: &str = "<>";
const POSITIONAL_FIELDS: usize = 5;
const NUMBERED_FIELDS: usize = 6;

/// Which part of the thread a response covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseWindow {
    /// Sequence number preceding the first line of the response
    pub offset: u64,
    /// Last sequence number already archived; records at or below are dropped
    pub from_seq: u64,
    /// Highest sequence number to keep this run
    pub upto: Option<u64>,
}

impl ParseWindow {
    /// Window for a response holding the whole thread.
    pub fn full(from_seq: u64) -> Self {
        Self {
            offset: 0,
            from_seq,
            upto: None,
        }
    }

    /// Window for a response starting right after `from_seq`.
    pub fn suffix(from_seq: u64) -> Self {
        Self {
            offset: from_seq,
            from_seq,
            upto: None,
        }
    }

    /// Keep at most `max_posts` posts past `from_seq`. Zero means no cap.
    pub fn capped(mut self, max_posts: u64) -> Self {
        if max_posts > 0 {
            self.upto = Some(self.from_seq.saturating_add(max_posts));
        }
        self
    }
}

/// One parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRecord {
    WellFormed(Post),
    Malformed(String),
}

/// Posts kept from a response plus the count of malformed lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub posts: Vec<Post>,
    pub skipped: usize,
}

/// Parser for `<>`-delimited post records.
#[derive(Debug, Clone, Copy)]
pub struct PostParser {
    layout: RecordLayout,
}

impl PostParser {
    pub fn new(layout: RecordLayout) -> Self {
        Self { layout }
    }

    /// Parse a single line. `position` is the sequence number implied by the
    /// line's place in the response.
    pub fn parse_record(&self, line: &str, position: u64) -> ParsedRecord {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();

        let (seq, rest) = match self.layout {
            RecordLayout::Positional => {
                if fields.len() < POSITIONAL_FIELDS {
                    return ParsedRecord::Malformed(line.to_string());
                }
                (position, &fields[..])
            }
            RecordLayout::Numbered => {
                if fields.len() < NUMBERED_FIELDS {
                    return ParsedRecord::Malformed(line.to_string());
                }
                let declared = fields[0].trim().parse::<u64>().ok().filter(|n| *n > 0);
                (declared.unwrap_or(position), &fields[1..])
            }
        };

        ParsedRecord::WellFormed(Post {
            seq,
            author: rest[0].trim().to_string(),
            contact: rest[1].trim().to_string(),
            timestamp: rest[2].trim().to_string(),
            body: LINE_BREAK.replace_all(rest[3], "\n").into_owned(),
        })
    }

    /// Parse a whole response, keeping posts inside `window` in order.
    pub fn parse(&self, raw: &str, window: ParseWindow) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();
        let mut last_seq = window.from_seq;

        let content = raw.trim_end_matches(['\r', '\n']);
        if content.is_empty() {
            return outcome;
        }

        for (index, line) in content.lines().enumerate() {
            let position = window.offset.saturating_add(index as u64 + 1);
            match self.parse_record(line, position) {
                ParsedRecord::WellFormed(post) => {
                    if post.seq <= window.from_seq {
                        continue;
                    }
                    if window.upto.is_some_and(|upto| post.seq > upto) {
                        continue;
                    }
                    if post.seq <= last_seq {
                        log::warn!(
                            "Skipping out-of-order record {} after {} at line {}",
                            post.seq,
                            last_seq,
                            index + 1
                        );
                        outcome.skipped += 1;
                        continue;
                    }
                    last_seq = post.seq;
                    outcome.posts.push(post);
                }
                ParsedRecord::Malformed(raw_line) => {
                    if position <= window.from_seq {
                        continue;
                    }
                    log::warn!(
                        "Skipping malformed record at line {}: {}",
                        index + 1,
                        preview(&raw_line)
                    );
                    outcome.skipped += 1;
                }
            }
        }

        outcome
    }
}

fn preview(line: &str) -> String {
    const MAX_CHARS: usize = 80;
    if line.chars().count() <= MAX_CHARS {
        line.to_string()
    } else {
        let cut: String = line.chars().take(MAX_CHARS).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dat_line(n: u64) -> String {
        format!("名無しさん<>sage<>2025/01/01(水) 00:00:{n:02}.00 ID:abc{n}<> post {n} <>")
    }

    fn dat(range: std::ops::RangeInclusive<u64>) -> String {
        range.map(|n| dat_line(n) + "\n").collect()
    }

    #[test]
    fn parses_positional_records() {
        let parser = PostParser::new(RecordLayout::Positional);
        let outcome = parser.parse(&dat(1..=5), ParseWindow::full(0));

        assert_eq!(outcome.skipped, 0);
        let seqs: Vec<u64> = outcome.posts.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);

        let first = &outcome.posts[0];
        assert_eq!(first.author, "名無しさん");
        assert_eq!(first.contact, "sage");
        assert_eq!(first.timestamp, "2025/01/01(水) 00:00:01.00 ID:abc1");
        assert_eq!(first.body, " post 1 ");
    }

    #[test]
    fn full_window_filters_already_seen() {
        let parser = PostParser::new(RecordLayout::Positional);
        let outcome = parser.parse(&dat(1..=8), ParseWindow::full(5));
        let seqs: Vec<u64> = outcome.posts.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![6, 7, 8]);
    }

    #[test]
    fn suffix_window_offsets_positions() {
        let parser = PostParser::new(RecordLayout::Positional);
        let raw = dat_line(11) + "\n" + &dat_line(12);
        let outcome = parser.parse(&raw, ParseWindow::suffix(10));
        let seqs: Vec<u64> = outcome.posts.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![11, 12]);
    }

    #[test]
    fn one_truncated_record_among_ten() {
        let parser = PostParser::new(RecordLayout::Positional);
        let mut lines: Vec<String> = (1..=10).map(dat_line).collect();
        lines[3] = "名無しさん<>sage<>2025/01/01".to_string();
        let raw = lines.join("\n");

        let outcome = parser.parse(&raw, ParseWindow::full(0));
        assert_eq!(outcome.posts.len(), 9);
        assert_eq!(outcome.skipped, 1);
        assert!(outcome.posts.iter().all(|p| p.seq != 4));
        assert_eq!(outcome.posts.last().map(|p| p.seq), Some(10));
    }

    #[test]
    fn converts_line_breaks_only() {
        let parser = PostParser::new(RecordLayout::Positional);
        let record = parser.parse_record("a<>b<>c<> first <br> second <br><br> &gt; third <>", 1);
        let ParsedRecord::WellFormed(post) = record else {
            panic!("expected well-formed record");
        };
        assert_eq!(post.body, " first\nsecond\n\n&gt; third ");
    }

    #[test]
    fn numbered_layout_uses_declared_seq() {
        let parser = PostParser::new(RecordLayout::Numbered);
        let raw = "7<>a<>b<>c<>d<>\n9<>a<>b<>c<>d<>\n";
        let outcome = parser.parse(raw, ParseWindow::suffix(6));
        let seqs: Vec<u64> = outcome.posts.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![7, 9]);
    }

    #[test]
    fn numbered_layout_falls_back_to_position() {
        let parser = PostParser::new(RecordLayout::Numbered);
        let raw = "<>a<>b<>c<>d<>\n<>a<>b<>c<>d<>\n";
        let outcome = parser.parse(raw, ParseWindow::suffix(3));
        let seqs: Vec<u64> = outcome.posts.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![4, 5]);
    }

    #[test]
    fn out_of_order_records_are_skipped_not_reordered() {
        let parser = PostParser::new(RecordLayout::Numbered);
        let raw = "3<>a<>b<>c<>d<>\n2<>a<>b<>c<>d<>\n4<>a<>b<>c<>d<>\n";
        let outcome = parser.parse(raw, ParseWindow::full(0));
        let seqs: Vec<u64> = outcome.posts.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![3, 4]);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn cap_limits_posts_per_run() {
        let parser = PostParser::new(RecordLayout::Positional);
        let outcome = parser.parse(&dat(1..=10), ParseWindow::full(2).capped(3));
        let seqs: Vec<u64> = outcome.posts.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![3, 4, 5]);
    }

    #[test]
    fn empty_response_yields_nothing() {
        let parser = PostParser::new(RecordLayout::Positional);
        assert_eq!(parser.parse("", ParseWindow::full(0)), ParseOutcome::default());
        assert_eq!(parser.parse("\r\n\n", ParseWindow::full(0)), ParseOutcome::default());
    }

    #[test]
    fn positions_saturate_at_the_top_of_the_range() {
        let parser = PostParser::new(RecordLayout::Positional);
        let outcome = parser.parse(&dat(1..=3), ParseWindow::suffix(u64::MAX - 1));
        let seqs: Vec<u64> = outcome.posts.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![u64::MAX]);
        assert_eq!(outcome.skipped, 2);
    }
}
