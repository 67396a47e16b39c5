//! Worst-case resolution of composite rating cells.
//!
//! Rating sheets often carry several agencies' opinions in one cell, e.g.
//! `AA-/A+` or `*BBB*/BB`. The resolved label is the riskiest rating found.

use coop_model::{Rating, RatingValue};

/// Parses one slash-separated segment into a scale rating.
fn segment_rating(segment: &str) -> Option<Rating> {
    let base = segment.trim().trim_end_matches(['+', '-']);
    let code: String = base
        .chars()
        .filter(|ch| ch.is_alphabetic())
        .flat_map(char::to_uppercase)
        .collect();
    code.parse().ok()
}

/// Resolves a raw rating cell to its worst (highest-risk) rating.
///
/// Asterisks are ignored, each `/` segment is trimmed and stripped of
/// trailing `+`/`-` modifiers and non-letters, then matched against the
/// scale. Returns the empty label when nothing matches. Never fails.
pub fn resolve_worst_rating(raw: &str) -> RatingValue {
    let cleaned = raw.replace('*', "");
    RatingValue::new(cleaned.split('/').filter_map(segment_rating).max())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_worst_segment() {
        assert_eq!(resolve_worst_rating("AA-/A+").as_str(), "A");
        assert_eq!(resolve_worst_rating("A/BBB/AA").as_str(), "BBB");
        assert_eq!(resolve_worst_rating("B / C").as_str(), "C");
    }

    #[test]
    fn single_ratings() {
        assert_eq!(resolve_worst_rating("BBB").as_str(), "BBB");
        assert_eq!(resolve_worst_rating("*AAA*").as_str(), "AAA");
        assert_eq!(resolve_worst_rating("aa+").as_str(), "AA");
        assert_eq!(resolve_worst_rating(" E ").as_str(), "E");
    }

    #[test]
    fn unmatched_input_is_empty() {
        assert_eq!(resolve_worst_rating("").as_str(), "");
        assert_eq!(resolve_worst_rating("XYZ").as_str(), "");
        assert_eq!(resolve_worst_rating("///").as_str(), "");
        assert_eq!(resolve_worst_rating("nan").as_str(), "");
    }

    #[test]
    fn unmatched_segments_are_ignored() {
        assert_eq!(resolve_worst_rating("N/A/BB+").as_str(), "BB");
        assert_eq!(resolve_worst_rating("AAA/pending").as_str(), "AAA");
    }

    #[test]
    fn digits_and_punctuation_are_dropped() {
        assert_eq!(resolve_worst_rating("A1").as_str(), "A");
        assert_eq!(resolve_worst_rating("(BB)").as_str(), "BB");
    }
}
