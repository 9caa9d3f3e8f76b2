//! Rank extraction from free-text judge verdicts.
//!
//! Judges are free-text LLMs. They are asked to end with a block like
//!
//! ```text
//! FINAL RANKING:
//! 1. Response C
//! 2. Response A
//! ```
//!
//! but nothing guarantees they do. [`parse_ranking`] degrades through a
//! fixed fallback chain instead of rejecting malformed output:
//!
//! | Step | Scope | Pattern |
//! |------|-------|---------|
//! | 1 | text after first `FINAL RANKING:` | numbered `1. Response X` |
//! | 2 | text after first `FINAL RANKING:` | bare `Response X` |
//! | 3 | whole text (no marker present) | bare `Response X` |
//!
//! A label is `Response ` followed by one or two capital letters; whatever
//! comes next is not inspected, so `Response A_` and `Response Ais` both
//! yield `Response A`.

use crate::council::label::Label;
use regex::Regex;
use std::sync::LazyLock;

/// Marker that opens the structured verdict section.
pub const FINAL_RANKING_MARKER: &str = "FINAL RANKING:";

static NUMBERED_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\.\s*(Response [A-Z]{1,2})").expect("numbered label pattern is valid")
});

static BARE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Response [A-Z]{1,2}").expect("bare label pattern is valid")
});

/// Parse a judge's verdict into an ordered label sequence.
///
/// Never fails: the worst case is an empty ranking.
///
/// # Examples
///
/// ```
/// use council_domain::council::ranking::parse_ranking;
///
/// let ranking = parse_ranking("intro text FINAL RANKING:\n1. Response B\n2. Response A");
/// let labels: Vec<&str> = ranking.iter().map(|l| l.as_str()).collect();
/// assert_eq!(labels, ["Response B", "Response A"]);
///
/// assert!(parse_ranking("no marker, no mentions").is_empty());
/// ```
pub fn parse_ranking(text: &str) -> Vec<Label> {
    if let Some((_, verdict)) = text.split_once(FINAL_RANKING_MARKER) {
        let numbered: Vec<Label> = NUMBERED_LABEL
            .captures_iter(verdict)
            .filter_map(|caps| caps.get(1))
            .map(|m| Label::new(m.as_str()))
            .collect();
        if !numbered.is_empty() {
            return numbered;
        }
        return bare_labels(verdict);
    }

    bare_labels(text)
}

fn bare_labels(text: &str) -> Vec<Label> {
    BARE_LABEL
        .find_iter(text)
        .map(|m| Label::new(m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(text: &str) -> Vec<String> {
        parse_ranking(text)
            .into_iter()
            .map(|l| l.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_numbered_list_after_marker() {
        assert_eq!(
            labels("intro text FINAL RANKING:\n1. Response B\n2. Response A"),
            ["Response B", "Response A"]
        );
    }

    #[test]
    fn test_no_marker_no_mentions_is_empty() {
        assert!(labels("no marker, no mentions").is_empty());
        assert!(labels("").is_empty());
    }

    #[test]
    fn test_evaluation_text_before_marker_is_ignored() {
        let text = "Response A is thorough. Response C misses the point.\n\n\
                    FINAL RANKING:\n1. Response C\n2. Response A\n3. Response B";
        assert_eq!(labels(text), ["Response C", "Response A", "Response B"]);
    }

    #[test]
    fn test_numbered_without_space() {
        assert_eq!(
            labels("FINAL RANKING:\n1.Response B\n2.Response A"),
            ["Response B", "Response A"]
        );
    }

    #[test]
    fn test_numbered_entries_win_over_bare_mentions() {
        let text = "FINAL RANKING:\nI liked Response C most.\n1. Response A\n2. Response B";
        assert_eq!(labels(text), ["Response A", "Response B"]);
    }

    #[test]
    fn test_bare_labels_after_marker() {
        let text = "Thoughts on Response A.\nFINAL RANKING: Response B, then Response A";
        assert_eq!(labels(text), ["Response B", "Response A"]);
    }

    #[test]
    fn test_marker_with_nothing_after_is_empty() {
        // Mentions before the marker are not consulted once the marker exists.
        assert!(labels("Response A was best.\nFINAL RANKING:").is_empty());
    }

    #[test]
    fn test_only_first_marker_splits() {
        let text = "FINAL RANKING:\n1. Response B\nFINAL RANKING:\n1. Response A";
        assert_eq!(labels(text), ["Response B", "Response A"]);
    }

    #[test]
    fn test_fallback_scans_whole_text_without_marker() {
        let text = "Response B is best, Response A second, Response C last.";
        assert_eq!(labels(text), ["Response B", "Response A", "Response C"]);
    }

    #[test]
    fn test_lowercase_marker_is_not_a_marker() {
        let text = "final ranking:\n1. Response B\n2. Response A";
        assert_eq!(labels(text), ["Response B", "Response A"]);
    }

    #[test]
    fn test_duplicates_and_unknown_labels_are_kept() {
        let text = "FINAL RANKING:\n1. Response A\n2. Response A\n3. Response Q";
        assert_eq!(labels(text), ["Response A", "Response A", "Response Q"]);
    }

    #[test]
    fn test_two_letter_labels() {
        let text = "FINAL RANKING:\n1. Response AB\n2. Response Z";
        assert_eq!(labels(text), ["Response AB", "Response Z"]);
    }

    #[test]
    fn test_label_followed_by_word_character() {
        assert_eq!(
            labels("FINAL RANKING:\n1. Response A_\n2. Response Bis"),
            ["Response A", "Response B"]
        );
        assert_eq!(labels("Response Ais best"), ["Response A"]);
    }

    #[test]
    fn test_plural_is_not_a_label() {
        assert!(labels("Responses Are fine").is_empty());
    }
}
