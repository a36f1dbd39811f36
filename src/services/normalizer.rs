//! Text canonicalization for keyword matching.

use unicode_normalization::UnicodeNormalization;

/// Canonicalizes text so that width- and case-variant forms compare equal.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

/// NFKC compatibility normalization, lowercase folding, whitespace removal.
///
/// `ＲＴＸ　４０９０` and `rtx4090` normalize to the same string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalNormalizer;

impl Normalizer for CanonicalNormalizer {
    fn normalize(&self, text: &str) -> String {
        text.nfkc()
            .flat_map(char::to_lowercase)
            .filter(|c| !c.is_whitespace())
            .collect()
    }
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn normalize(&self, text: &str) -> String {
        text.to_string()
    }
}
