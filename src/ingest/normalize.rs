//! Transcript normalization and content fingerprinting.
//!
//! Caption sources disagree on casing, spacing, and punctuation between
//! fetches of the same track. Hashing the normalized form instead of the raw
//! text keeps those cosmetic differences from forcing a reindex.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"))
}

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("Invalid regex"))
}

/// Canonicalize transcript text for fingerprinting.
///
/// Lower-cases, collapses whitespace runs to a single space, strips
/// non-word/non-space characters, and trims. Pure and deterministic.
pub fn normalize_text(text: &str) -> String {
    let text = text.to_lowercase();
    let text = whitespace_runs().replace_all(&text, " ");
    let text = punctuation().replace_all(&text, "");
    text.trim().to_string()
}

/// SHA-256 digest of the text's UTF-8 bytes, as a lowercase hex string.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_trims() {
        assert_eq!(normalize_text("  Hello World  "), "hello world");
    }

    #[test]
    fn test_normalize_collapses_whitespace_runs() {
        assert_eq!(normalize_text("one\t\ttwo\n\nthree   four"), "one two three four");
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize_text("Hello, World!"), "hello world");
        assert_eq!(normalize_text("don't-stop"), "dontstop");
    }

    #[test]
    fn test_normalize_keeps_unicode_word_characters() {
        assert_eq!(normalize_text("Grüße, Verden!"), "grüße verden");
    }

    #[test]
    fn test_fingerprint_is_deterministic_across_cosmetic_variants() {
        let variants = [
            "The Quick   Brown Fox.",
            "the quick brown fox",
            "  THE QUICK\nBROWN FOX!  ",
        ];
        let digests: Vec<String> = variants
            .iter()
            .map(|v| fingerprint(&normalize_text(v)))
            .collect();
        assert_eq!(digests[0], digests[1]);
        assert_eq!(digests[1], digests[2]);
    }

    #[test]
    fn test_fingerprint_known_digest() {
        // sha256("hello world")
        assert_eq!(
            fingerprint(&normalize_text("Hello,   World!")),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_fingerprint_shape() {
        let digest = fingerprint("anything");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_different_content_different_fingerprint() {
        assert_ne!(
            fingerprint(&normalize_text("first transcript")),
            fingerprint(&normalize_text("second transcript"))
        );
    }
}
