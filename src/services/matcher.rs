//! Thread selection from a board listing.

use std::cmp::Ordering;

use crate::models::{KeywordSet, MatchResult, ThreadListingEntry, ThreadMatch};
use crate::services::Normalizer;

/// Selects the live thread for a set of keywords.
pub struct ThreadMatcher<'a> {
    normalizer: &'a dyn Normalizer,
}

impl<'a> ThreadMatcher<'a> {
    pub fn new(normalizer: &'a dyn Normalizer) -> Self {
        Self { normalizer }
    }

    /// Pick the entry whose title contains every keyword.
    ///
    /// Among several matches the largest thread id wins: ids are creation
    /// timestamps, so the largest one is the thread currently in use.
    pub fn find(&self, listing: &[ThreadListingEntry], criteria: &KeywordSet) -> MatchResult {
        if criteria.is_empty() {
            return MatchResult::NotFound;
        }

        let keywords: Vec<String> = criteria
            .iter()
            .map(|k| self.normalizer.normalize(k))
            .filter(|k| !k.is_empty())
            .collect();

        let mut best: Option<&ThreadListingEntry> = None;
        for entry in listing {
            let title = self.normalizer.normalize(&entry.raw_title);
            if !keywords.iter().all(|k| title.contains(k.as_str())) {
                continue;
            }
            best = match best {
                Some(current)
                    if compare_thread_ids(&entry.thread_id, &current.thread_id)
                        != Ordering::Greater =>
                {
                    Some(current)
                }
                _ => Some(entry),
            };
        }

        match best {
            Some(entry) => MatchResult::Found(ThreadMatch {
                thread_id: entry.thread_id.clone(),
                title: entry.raw_title.clone(),
            }),
            None => MatchResult::NotFound,
        }
    }
}

/// Order thread ids numerically; non-numeric ids sort after numeric ones.
pub fn compare_thread_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CanonicalNormalizer;

    fn entry(id: &str, title: &str) -> ThreadListingEntry {
        ThreadListingEntry::new(id, title)
    }

    fn find(listing: &[ThreadListingEntry], keywords: &[&str]) -> MatchResult {
        ThreadMatcher::new(&CanonicalNormalizer).find(listing, &KeywordSet::new(keywords.to_vec()))
    }

    #[test]
    fn requires_every_keyword() {
        let listing = vec![
            entry("100", "Grok 画像スレ Part1"),
            entry("200", "Grok 雑談"),
        ];
        let result = find(&listing, &["画像", "grok"]);
        assert_eq!(result.found().unwrap().thread_id, "100");
    }

    #[test]
    fn largest_thread_id_wins() {
        let listing = vec![
            entry("1700000300", "なんJNVA部★300"),
            entry("1700000900", "なんJNVA部★301"),
            entry("1700000500", "なんJNVA部★299"),
        ];
        let result = find(&listing, &["なんJNVA部"]);
        assert_eq!(result.found().unwrap().thread_id, "1700000900");
    }

    #[test]
    fn largest_id_is_numeric_not_lexicographic() {
        let listing = vec![entry("99", "RTX part1"), entry("100", "RTX part2")];
        assert_eq!(find(&listing, &["RTX"]).found().unwrap().thread_id, "100");
    }

    #[test]
    fn equal_ids_keep_first_listed() {
        let listing = vec![entry("100", "RTX first"), entry("100", "RTX second")];
        assert_eq!(find(&listing, &["RTX"]).found().unwrap().title, "RTX first");
    }

    #[test]
    fn width_variants_match() {
        let listing = vec![entry("100", "【ＣｏｍｆｙＵＩ】 Part 5")];
        assert!(matches!(find(&listing, &["comfyui"]), MatchResult::Found(_)));
    }

    #[test]
    fn no_match_is_not_found() {
        let listing = vec![entry("100", "Stable Diffusion")];
        assert_eq!(find(&listing, &["Grok"]), MatchResult::NotFound);
        assert_eq!(find(&[], &["Grok"]), MatchResult::NotFound);
    }

    #[test]
    fn empty_criteria_never_match() {
        let listing = vec![entry("100", "anything")];
        assert_eq!(find(&listing, &[]), MatchResult::NotFound);
    }

    #[test]
    fn compares_mixed_ids() {
        assert_eq!(compare_thread_ids("5", "abc"), Ordering::Less);
        assert_eq!(compare_thread_ids("abd", "abc"), Ordering::Greater);
        assert_eq!(compare_thread_ids("zz", "aaa"), Ordering::Less);
    }
}
